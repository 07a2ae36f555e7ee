// src/services/gate.rs

//! Operator escalation on count discrepancies.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::Discrepancy;

/// Checkpoint the walker stops at when a discrepancy is found.
///
/// The walk resumes once `acknowledge` returns; returning an error aborts it.
#[async_trait]
pub trait OperatorGate: Send + Sync {
    async fn acknowledge(&self, discrepancy: &Discrepancy) -> Result<()>;
}

/// Blocks until the operator presses Enter on the console.
pub struct ConsoleGate;

#[async_trait]
impl OperatorGate for ConsoleGate {
    async fn acknowledge(&self, discrepancy: &Discrepancy) -> Result<()> {
        log::error!("ERROR IN {}", discrepancy.institution);
        log::error!("FOUND: {}", discrepancy.found);
        log::error!("EXPECTED: {}", discrepancy.expected);

        tokio::task::spawn_blocking(|| -> io::Result<()> {
            let mut stdout = io::stdout();
            write!(stdout, "Press Enter to continue...")?;
            stdout.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Io(io::Error::other(e)))??;

        log::info!("Discrepancy for {} acknowledged", discrepancy.institution);
        Ok(())
    }
}

/// Reports the discrepancy and continues without pausing.
pub struct LogOnlyGate;

#[async_trait]
impl OperatorGate for LogOnlyGate {
    async fn acknowledge(&self, discrepancy: &Discrepancy) -> Result<()> {
        log::error!("{}", discrepancy);
        Ok(())
    }
}
