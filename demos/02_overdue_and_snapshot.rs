/// overdue tracking and json snapshots
use chrono::{Duration, TimeZone, Utc};
use loan_ledger_rs::{
    unix_seconds, Address, LedgerConfig, LedgerSnapshot, LoanLedger, LoanRequest, LoanTerms,
    LoanView, SafeTimeProvider, TimeSource, U256,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== overdue loans ===\n");

    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let controller = time.test_control().unwrap();
    let borrower = Address::repeat_byte(0x22);

    let mut ledger = LoanLedger::new(LedgerConfig::default())?;
    for (days, amount) in [(7u64, 1_000u64), (30, 5_000), (90, 20_000)] {
        let terms = LoanTerms::new(1_200, start.timestamp() as u64, days * 86_400, 500)
            .with_salt(u128::from(days));
        ledger.create_loan(LoanRequest {
            lender_order_id: U256::from(days),
            lender: Address::repeat_byte(0x11),
            borrower,
            relayer: Address::repeat_byte(0x33),
            asset: Address::repeat_byte(0x44),
            amount: U256::from(amount),
            terms: terms.encode()?,
        })?;
    }

    for step in [10, 30, 60] {
        controller.advance(Duration::days(step));
        let overdue = ledger.get_overdue_loans(borrower, &time)?;
        println!(
            "{}: {} of {} loans overdue",
            time.now().format("%Y-%m-%d"),
            overdue.len(),
            ledger.loans_of(borrower).len()
        );
    }

    let now = unix_seconds(&time)?;
    let view = LoanView::from_loan(ledger.get_loan(U256::ZERO)?, now);
    println!("\nfirst loan\n{}", view.to_json_pretty()?);

    let snapshot = LedgerSnapshot::capture(&ledger, "end of quarter".to_string(), &time);
    println!("\nsnapshot\n{}", snapshot.to_json_pretty()?);

    let restored = snapshot.restore()?;
    println!("\nrestored {} loans", restored.store().count());

    Ok(())
}
