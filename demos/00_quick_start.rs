/// quick start - pack terms, open a loan, read it back
use loan_ledger_rs::{Address, LedgerConfig, LoanLedger, LoanRequest, LoanTerms, U256};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut ledger = LoanLedger::new(LedgerConfig::default())?;

    // 5% a year, one day long, relayer keeps 10% of the interest
    let terms = LoanTerms::new(500, 1_000, 86_400, 1_000);
    let packed = terms.encode()?;

    let id = ledger.create_loan(LoanRequest {
        lender_order_id: U256::from(1u64),
        lender: Address::repeat_byte(0x11),
        borrower: Address::repeat_byte(0x22),
        relayer: Address::repeat_byte(0x33),
        asset: Address::repeat_byte(0x44),
        amount: U256::from(100_000u64),
        terms: packed,
    })?;

    let loan = ledger.get_loan(id)?;
    println!("loan {} opened for {}", id, loan.amount);
    println!("terms word: {:#066x}", loan.terms);
    println!("rate: {}, due at: {}", loan.decoded_terms().annual_rate(), loan.decoded_terms().due_at());

    Ok(())
}
