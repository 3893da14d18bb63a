/// lifecycle - repay with interest and relayer fee, then close
use chrono::{Duration, TimeZone, Utc};
use loan_ledger_rs::{
    Address, InMemoryBalances, LedgerConfig, LoanLedger, LoanRequest, LoanTerms, SafeTimeProvider,
    TimeSource, U256, SECONDS_PER_YEAR,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== loan lifecycle ===\n");

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let controller = time.test_control().unwrap();

    let lender = Address::repeat_byte(0x11);
    let borrower = Address::repeat_byte(0x22);
    let relayer = Address::repeat_byte(0x33);
    let asset = Address::repeat_byte(0x44);

    let mut balances = InMemoryBalances::new();
    balances.credit(asset, borrower, U256::from(2_000_000u64));

    let mut ledger = LoanLedger::new(LedgerConfig::default())?;
    let terms = LoanTerms::new(1_000, start.timestamp() as u64, SECONDS_PER_YEAR, 2_000);
    let id = ledger.create_loan(LoanRequest {
        lender_order_id: U256::from(7u64),
        lender,
        borrower,
        relayer,
        asset,
        amount: U256::from(1_000_000u64),
        terms: terms.encode()?,
    })?;
    println!("1. opened loan {} on {}", id, time.now().format("%Y-%m-%d"));

    // half the principal after six months
    controller.advance(Duration::days(182));
    let quote = ledger.settle_loan(id, borrower, U256::from(500_000u64), &mut balances, &time)?;
    println!("\n2. partial repayment on {}", time.now().format("%Y-%m-%d"));
    println!("   interest: {}, relayer fee: {}", quote.interest, quote.relayer_fee);
    println!("   status: {:?}", ledger.get_loan(id)?.status);

    // the rest at maturity
    controller.advance(Duration::days(183));
    let quote = ledger.settle_loan(id, borrower, U256::from(500_000u64), &mut balances, &time)?;
    println!("\n3. final repayment on {}", time.now().format("%Y-%m-%d"));
    println!("   interest: {}, relayer fee: {}", quote.interest, quote.relayer_fee);
    println!("   status: {:?}", ledger.get_loan(id)?.status);
    println!("   open loans for borrower: {}", ledger.loans_of(borrower).len());

    println!("\nbalances");
    println!("   lender:  {}", balances.balance_of(asset, lender));
    println!("   relayer: {}", balances.balance_of(asset, relayer));

    println!("\nevents");
    for event in ledger.take_events() {
        println!("   {:?}", event);
    }

    Ok(())
}
