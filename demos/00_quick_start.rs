/// quick start - minimal example to get started
use investment_ledger::{
    Admin, AdminRole, AdminToken, Ledger, LedgerConfig, Money, PlanConfig, SafeTimeProvider,
    TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let ledger = Ledger::in_memory(LedgerConfig::default())?;
    let admin = AdminToken::issue(&Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::Admin))?;

    // open an account and offer the starter plan
    let account = ledger.open_account("Ada Obi", "ada@example.com", &time)?;
    let plan = ledger.add_plan(&admin, PlanConfig::starter(), &time)?;

    // invest $10,000 by transfer, then approve and pay out
    let investment = ledger.create_investment(
        account.id(),
        plan.id,
        Money::from_major(10_000),
        Some("wire-0001".to_string()),
        &time,
    )?;
    ledger.approve_investment(&admin, investment.id(), &time)?;
    ledger.complete_investment(&admin, investment.id(), &time)?;

    // print current state
    println!("{}", ledger.account_view(account.id())?.to_json_pretty()?);

    Ok(())
}
