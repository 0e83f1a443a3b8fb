//! Decode a signed raw transaction into a `debug_traceCall` call object.

use crate::rpc::CallRequest;
use crate::utils::error::ApiError;
use alloy_consensus::transaction::SignerRecoverable;
use alloy_consensus::{Transaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use log::debug;

/// Decode EIP-2718 bytes (legacy RLP or typed) and recover the sender
///
/// # Errors
/// * `ApiError::InvalidTransaction` - malformed or trailing bytes
/// * `ApiError::SignerRecovery` - the signature does not recover
pub fn decode_raw_transaction(data: &[u8]) -> Result<CallRequest, ApiError> {
    if data.is_empty() {
        return Err(ApiError::InvalidTransaction("empty input".to_string()));
    }

    let mut buf = data;
    let tx = TxEnvelope::decode_2718(&mut buf)
        .map_err(|e| ApiError::InvalidTransaction(e.to_string()))?;
    if !buf.is_empty() {
        return Err(ApiError::InvalidTransaction(format!(
            "{} trailing bytes",
            buf.len()
        )));
    }

    let from = tx
        .recover_signer()
        .map_err(|e| ApiError::SignerRecovery(e.to_string()))?;

    debug!("Decoded raw transaction from {}", from);

    Ok(CallRequest {
        from,
        to: tx.to(),
        gas: tx.gas_limit(),
        data: tx.input().clone(),
        gas_price: tx.gas_price().unwrap_or_else(|| tx.max_fee_per_gas()),
        value: tx.value(),
    })
}
