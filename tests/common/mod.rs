//! Shared utilities for integration tests: a mock JSON-RPC node on a local TCP port.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::primitives::{hex, keccak256, Address, B256};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Well-known test private key (Anvil's first account).
pub const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const ANVIL_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
pub const RECIPIENT: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Default)]
pub struct NodeState {
    pub chain_id: u64,
    pub block_number: u64,
    pub gas_price: u128,
    pub balances: HashMap<Address, u128>,
    pub nonces: HashMap<Address, u64>,
    /// Error message returned for `eth_sendRawTransaction`.
    pub reject_with: Option<String>,
    /// Mine submitted transactions immediately.
    pub auto_mine: bool,
    pub mined: HashSet<B256>,
    pub submitted: Vec<Vec<u8>>,
    pub calls: Vec<String>,
}

/// Handle to a running mock node.
#[derive(Clone)]
pub struct MockNode {
    pub addr: SocketAddr,
    pub state: Arc<Mutex<NodeState>>,
}

impl MockNode {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_balance(&self, address: &str, wei: u128) {
        let address: Address = address.parse().unwrap();
        self.state.lock().unwrap().balances.insert(address, wei);
    }

    pub fn set_nonce(&self, address: &str, nonce: u64) {
        let address: Address = address.parse().unwrap();
        self.state.lock().unwrap().nonces.insert(address, nonce);
    }

    pub fn reject_with(&self, message: &str) {
        self.state.lock().unwrap().reject_with = Some(message.to_string());
    }

    pub fn submitted(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }
}

/// Start a mock node serving `chain_id` on an ephemeral port.
pub async fn start_mock_node(chain_id: u64) -> MockNode {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(Mutex::new(NodeState {
        chain_id,
        block_number: 100,
        gas_price: 1_000_000_000,
        auto_mine: true,
        ..NodeState::default()
    }));

    let shared = state.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let state = shared.clone();
                    tokio::spawn(async move {
                        let _ = serve_connection(socket, state).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockNode { addr, state }
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

async fn serve_connection(
    mut socket: TcpStream,
    state: Arc<Mutex<NodeState>>,
) -> std::io::Result<()> {
    loop {
        let Some(body) = read_request(&mut socket).await? else {
            return Ok(());
        };
        let response = match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Array(batch)) => {
                Value::Array(batch.iter().map(|req| handle(req, &state)).collect())
            }
            Ok(req) => handle(&req, &state),
            Err(_) => json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "parse error"}}),
        };
        let payload = response.to_string();
        let response_str = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            payload.len(),
            payload
        );
        socket.write_all(response_str.as_bytes()).await?;
    }
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(Some(buf[header_end..header_end + content_length].to_vec()))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn quantity(n: u128) -> Value {
    Value::String(format!("0x{n:x}"))
}

fn param_address(req: &Value, idx: usize) -> Address {
    req["params"][idx]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn handle(req: &Value, state: &Arc<Mutex<NodeState>>) -> Value {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default().to_string();
    let mut state = state.lock().unwrap();
    state.calls.push(method.clone());

    let result: Result<Value, (i64, String)> = match method.as_str() {
        "eth_chainId" => Ok(quantity(state.chain_id as u128)),
        "eth_blockNumber" => Ok(quantity(state.block_number as u128)),
        "eth_gasPrice" => Ok(quantity(state.gas_price)),
        "eth_getBalance" => {
            let address = param_address(req, 0);
            Ok(quantity(state.balances.get(&address).copied().unwrap_or(0)))
        }
        "eth_getTransactionCount" => {
            let address = param_address(req, 0);
            Ok(quantity(state.nonces.get(&address).copied().unwrap_or(0) as u128))
        }
        "eth_sendRawTransaction" => {
            let raw = req["params"][0]
                .as_str()
                .and_then(|s| hex::decode(s).ok())
                .unwrap_or_default();
            state.submitted.push(raw.clone());
            match state.reject_with.clone() {
                Some(message) => Err((-32000, message)),
                None => {
                    let hash = keccak256(&raw);
                    if state.auto_mine {
                        state.mined.insert(hash);
                    }
                    Ok(Value::String(hex::encode_prefixed(hash)))
                }
            }
        }
        "eth_getTransactionReceipt" => {
            let hash: B256 = req["params"][0]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default();
            if state.mined.contains(&hash) {
                state.block_number += 1;
                Ok(receipt_json(hash, state.block_number))
            } else {
                Ok(Value::Null)
            }
        }
        other => Err((-32601, format!("method {other} not found"))),
    };

    match result {
        Ok(value) => json!({"jsonrpc": "2.0", "id": id, "result": value}),
        Err((code, message)) => {
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
        }
    }
}

fn receipt_json(hash: B256, block_number: u64) -> Value {
    json!({
        "type": "0x0",
        "status": "0x1",
        "cumulativeGasUsed": "0x5208",
        "logs": [],
        "logsBloom": format!("0x{}", "00".repeat(256)),
        "transactionHash": hex::encode_prefixed(hash),
        "transactionIndex": "0x0",
        "blockHash": hex::encode_prefixed(B256::repeat_byte(0x11)),
        "blockNumber": quantity(block_number as u128),
        "gasUsed": "0x5208",
        "effectiveGasPrice": "0x3b9aca00",
        "from": format!("{}", Address::ZERO),
        "to": format!("{}", Address::repeat_byte(0x22)),
        "contractAddress": null
    })
}
