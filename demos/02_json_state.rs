/// json state - serialization for debugging and monitoring
use chrono::{TimeZone, Utc};
use investment_ledger::{
    Admin, AdminRole, AdminToken, Book, InvestmentView, Ledger, LedgerConfig, MemoryStore, Money,
    PlanConfig, SafeTimeProvider, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));

    // configuration can be loaded from json; missing fields take defaults
    let config = LedgerConfig::from_json(r#"{ "reverse_invested_on_cancel": true }"#)?;
    let store = MemoryStore::new();
    let ledger = Ledger::new(config, store.clone())?;
    let admin = AdminToken::issue(&Admin::new(Uuid::new_v4(), "Ops", "ops@example.com", AdminRole::Admin))?;

    let plan = ledger.add_plan(&admin, PlanConfig::growth(), &time)?;
    let account = ledger.open_account("Bo Lin", "bo@example.com", &time)?.id();
    let investment = ledger.create_investment(account, plan.id, Money::from_major(80_000), None, &time)?;

    // stage 1: pending
    println!("stage 1: requested (not yet approved)");
    println!("-------------------------------------");
    println!("{}\n", InvestmentView::from_investment(&investment).to_json_pretty()?);

    // stage 2: active
    let investment = ledger.approve_investment(&admin, investment.id(), &time)?;
    println!("stage 2: approved");
    println!("-----------------");
    println!("{}\n", InvestmentView::from_investment(&investment).to_json_pretty()?);

    // stage 3: account document
    println!("stage 3: account view");
    println!("---------------------");
    println!("{}\n", ledger.account_view(account)?.to_json_pretty()?);

    // stage 4: export the whole book and restore it elsewhere
    let exported = serde_json::to_string(&store.snapshot())?;
    let restored: Book = serde_json::from_str(&exported)?;
    let replica = Ledger::new(LedgerConfig::default(), MemoryStore::from_book(restored))?;
    println!("stage 4: restored replica");
    println!("-------------------------");
    println!("  bytes exported: {}", exported.len());
    println!("  replica investment status: {}", replica.investment(investment.id())?.status());
    println!("  replica events: {}", replica.events()?.len());

    Ok(())
}
