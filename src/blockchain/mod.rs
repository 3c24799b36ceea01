// src/blockchain/mod.rs

pub mod abi;
pub mod client;
pub mod explorer;

pub use client::{
    ChainClient, Recovered, TokenMetadata, TransactionReceipt, TransferRequest,
    UnsignedTransaction,
};
