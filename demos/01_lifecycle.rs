/// lifecycle - investments from request to payout, then a tier-gated withdrawal
use chrono::{Duration, TimeZone, Utc};
use investment_ledger::{
    AccrualOutcome, Admin, AdminRole, AdminToken, AdjustmentDirection, AdjustmentField, Ledger,
    LedgerConfig, Money, PlanConfig, Rate, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== investment lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let ledger = Ledger::in_memory(LedgerConfig::default())?;
    let admin = AdminToken::issue(&Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::SuperAdmin))?;
    let moderator = AdminToken::issue(&Admin::new(Uuid::new_v4(), "Mod", "mod@example.com", AdminRole::Moderator))?;

    let plans = ledger.seed_standard_catalog(&admin, &time)?;
    let starter = &plans[0];
    let account = ledger.open_account("Ada Obi", "ada@example.com", &time)?.id();

    // 1. request
    println!("1. request phase");
    println!("----------------");
    let investment = ledger.create_investment(
        account,
        starter.id,
        Money::from_major(10_000),
        Some("wire-0001".to_string()),
        &time,
    )?;
    println!("  plan: {}", investment.plan_snapshot().name);
    println!("  status: {}", investment.status());
    for week in &investment.projected().weekly_returns {
        println!(
            "    week {}: +${} -> ${}",
            week.week, week.return_amount, week.cumulative_value
        );
    }
    println!("  projected profit: ${}", investment.projected().total_profit);

    // 2. approval
    println!("\n2. approval phase");
    println!("-----------------");
    let investment = ledger.approve_investment(&moderator, investment.id(), &time)?;
    println!("  ✓ approved, profit fixed at ${}", investment.profit());

    // 3. weekly accrual
    println!("\n3. accrual phase");
    println!("----------------");
    for week in 1..=4 {
        controller.advance(Duration::days(7));
        if let AccrualOutcome::Applied(accrued) = ledger.accrue_week(investment.id(), week, &time)? {
            println!(
                "  {}: week {} value ${}",
                time.now().format("%Y-%m-%d"),
                accrued.week,
                accrued.cumulative_value
            );
        }
    }

    // 4. payout
    println!("\n4. payout phase");
    println!("---------------");
    ledger.complete_investment(&moderator, investment.id(), &time)?;
    let dashboard = ledger.dashboard(account)?;
    println!("  balance: ${}", dashboard.balance);
    println!("  total earnings: ${}", dashboard.total_earnings);
    println!("  tier: {} (can withdraw: {})", dashboard.tier, dashboard.can_withdraw);

    // 5. withdrawal is refused below tier 3
    println!("\n5. withdrawal phase");
    println!("-------------------");
    match ledger.request_withdrawal(account, Money::from_major(1_000), "bank", "GB00 0001", &time) {
        Ok(_) => println!("  unexpected: withdrawal accepted"),
        Err(err) => println!("  ✗ refused ({:?}): {}", err.kind(), err),
    }

    // a desk-placed position lifts the account into tier 3
    ledger.adjust(
        &admin,
        account,
        AdjustmentField::Balance,
        AdjustmentDirection::Credit,
        Money::from_major(5_000_000),
        "incoming wire",
        &time,
    )?;
    let desk = ledger.admin_create_investment(
        &admin,
        account,
        PlanConfig::custom("Desk Placement", Rate::from_percentage(2), 4, 30),
        Money::from_major(5_000_000),
        &time,
    )?;
    println!("  desk placement {} is {}", desk.id(), desk.status());

    let eligibility = ledger.withdrawal_eligibility(account)?;
    println!("  tier now: {} (can withdraw: {})", eligibility.tier, eligibility.can_withdraw);

    let withdrawal = ledger.request_withdrawal(account, Money::from_major(10_000), "bank", "GB00 0001", &time)?;
    let withdrawal = ledger.approve_withdrawal(&admin, withdrawal.id(), None, &time)?;
    println!(
        "  ✓ withdrawal {} paid, ref {}",
        withdrawal.amount(),
        withdrawal.external_ref().unwrap_or("-")
    );

    // 6. audit
    println!("\n6. audit");
    println!("--------");
    let report = ledger.audit_account(account)?;
    println!("  consistent: {}", report.is_consistent());
    println!("  events recorded: {}", ledger.events()?.len());

    Ok(())
}
