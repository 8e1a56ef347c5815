// Transaction module - THE WRITE PATH
// Wallet interfaces, local validation, and the confirmation-tracking manager

mod manager;
mod status;
mod validation;
mod wallet;

pub use manager::TransactionManager;
pub use status::{TransactionRecord, TxError, TxEvent, TxStatus};
pub use validation::{IntentValidator, ValidationError};
pub use wallet::{
    ReceiptProvider, ReceiptStatus, SignerError, TransactionSigner, TxHash, TxReceipt,
};
