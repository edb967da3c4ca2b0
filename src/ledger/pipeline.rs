use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::aggregator::metrics_delta;
use super::config::LedgerConfig;
use super::store::LedgerStore;
use crate::core::{
    Direction, Invoice, InvoiceBuilder, LedgerError, Party, Transaction, TransactionRequest,
    classify, compute, validate_transaction,
};

/// Fresh ids tried before an id collision is reported.
const MAX_ID_ATTEMPTS: usize = 3;

/// A completed sale as submitted by the host application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleRequest {
    pub transaction: TransactionRequest,
    pub customer: Party,
    /// Falls back to the configured default.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Id of an earlier invoice this sale corrects.
    #[serde(default)]
    pub corrects: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedSale {
    pub invoice: Invoice,
    /// True when the transaction had been invoiced before and the stored
    /// invoice is returned unchanged.
    pub already_processed: bool,
}

/// Runs a completed sale through validation, classification, VAT
/// calculation and invoicing, then commits invoice and daily metrics in
/// one store call.
pub struct SaleProcessor<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: LedgerStore> SaleProcessor<S> {
    /// Fails when `config` does not pass [`LedgerConfig::validate`].
    pub fn new(store: S, config: LedgerConfig) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Invoice a completed sale and record it in the daily metrics.
    ///
    /// Idempotent per transaction id: resubmitting the same transaction
    /// returns the stored invoice and leaves the metrics alone. A different
    /// transaction under an id that is already invoiced is rejected with
    /// [`LedgerError::DuplicateTransaction`].
    pub fn complete_sale(&self, sale: &SaleRequest) -> Result<ProcessedSale, LedgerError> {
        let transaction = validate_transaction(&sale.transaction, &self.config.allowed_vat_rates)?;
        if transaction.direction() != Direction::Income {
            return Err(LedgerError::Validation(
                "direction: only income transactions are invoiced".into(),
            ));
        }

        if let Some(existing) = self.store.invoice_for_transaction(transaction.id())? {
            return self.replayed(existing, &transaction);
        }

        if let Some(original) = &sale.corrects {
            if self.store.invoice(original)?.is_none() {
                return Err(LedgerError::Validation(format!(
                    "corrects: invoice {original} does not exist"
                )));
            }
        }

        let classification = classify(&transaction);
        let rate = transaction
            .vat_rate()
            .unwrap_or(self.config.default_vat_rate);
        let tax = compute(&transaction, rate)?;
        let delta = metrics_delta(&transaction, &tax)?;
        let issue_date = transaction.completed_on();
        let payment_method = sale
            .payment_method
            .clone()
            .unwrap_or_else(|| self.config.default_payment_method.clone());

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let mut builder = InvoiceBuilder::new(self.config.invoice_ids.next_id(issue_date), issue_date)
                .transaction(transaction.clone())
                .classification(classification)
                .tax(tax.clone())
                .provider(self.config.provider.clone())
                .customer(sale.customer.clone())
                .payment_method(payment_method.clone());
            if let Some(original) = &sale.corrects {
                builder = builder.corrects(original.clone());
            }
            let invoice = builder.build()?;

            match self.store.commit_sale(&invoice, delta.as_ref()) {
                Ok(()) => {
                    info!(
                        transaction_id = transaction.id(),
                        invoice_id = %invoice.id,
                        gross = %invoice.gross_amount(),
                        category = %classification.tax_category,
                        "sale completed"
                    );
                    return Ok(ProcessedSale {
                        invoice,
                        already_processed: false,
                    });
                }
                Err(LedgerError::DuplicateInvoice(id)) => {
                    warn!(invoice_id = %id, attempt, "invoice id collision, retrying");
                }
                Err(LedgerError::DuplicateTransaction(_)) => {
                    // Lost a race with a concurrent submission of the same transaction.
                    let existing = self
                        .store
                        .invoice_for_transaction(transaction.id())?
                        .ok_or_else(|| {
                            LedgerError::Persistence(format!(
                                "transaction {} reported as invoiced but not found",
                                transaction.id()
                            ))
                        })?;
                    return self.replayed(existing, &transaction);
                }
                Err(e) => {
                    error!(transaction_id = transaction.id(), error = %e, "sale commit failed");
                    return Err(e);
                }
            }
        }

        Err(LedgerError::Persistence(format!(
            "no unique invoice id for transaction {} after {MAX_ID_ATTEMPTS} attempts",
            transaction.id()
        )))
    }

    fn replayed(
        &self,
        existing: Invoice,
        transaction: &Transaction,
    ) -> Result<ProcessedSale, LedgerError> {
        if &existing.transaction != transaction {
            warn!(
                transaction_id = transaction.id(),
                invoice_id = %existing.id,
                "conflicting resubmission of an invoiced transaction"
            );
            return Err(LedgerError::DuplicateTransaction(transaction.id().to_string()));
        }
        debug!(
            transaction_id = transaction.id(),
            invoice_id = %existing.id,
            "transaction already invoiced"
        );
        Ok(ProcessedSale {
            invoice: existing,
            already_processed: true,
        })
    }
}
