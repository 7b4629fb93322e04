use crate::domain::user::UserAccount;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct BalanceRow<'a> {
    user: &'a str,
    name: &'a str,
    balance: String,
}

/// Writes the `user,name,balance` report.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes the header and one row per account in the order given, then flushes.
    pub fn write_accounts(&mut self, accounts: &[UserAccount]) -> Result<()> {
        self.writer.write_record(["user", "name", "balance"])?;
        for account in accounts {
            self.writer.serialize(BalanceRow {
                user: account.user_id.as_str(),
                name: &account.name,
                balance: account.balance.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
