//! In-process [`ContractCaller`] for tests.

use {
    crate::{ContractCallError, ContractCaller, MessageSent, Submission},
    alloy_primitives::{Address, B256, Bytes, Log, U256, keccak256},
    alloy_sol_types::SolEvent,
    async_trait::async_trait,
    std::{
        collections::{HashMap, VecDeque},
        sync::Mutex,
    },
};

/// A call observed by [`MockCaller`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub contract: Address,
    pub calldata: Bytes,
    pub note: Option<String>,
}

impl RecordedCall {
    pub fn selector(&self) -> [u8; 4] {
        selector(&self.calldata)
    }

    pub fn is_write(&self) -> bool {
        self.note.is_some()
    }
}

/// Scripted result of the next write.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    Confirm,
    /// Confirm with a `MessageSent(message)` log in the receipt.
    ConfirmWithMessage(Bytes),
    TimeOut,
    Revert(String),
    TransportFailure(String),
}

#[derive(Default)]
struct State {
    calls: Vec<RecordedCall>,
    views: HashMap<[u8; 4], Bytes>,
    writes: VecDeque<WriteOutcome>,
    nonce: u64,
}

/// Records every call. Views are answered by selector (zero word when not
/// set), writes pop scripted outcomes and confirm when the script is empty.
pub struct MockCaller {
    address: Address,
    state: Mutex<State>,
}

fn selector(calldata: &[u8]) -> [u8; 4] {
    let mut selector = [0u8; 4];
    if let Some(prefix) = calldata.get(..4) {
        selector.copy_from_slice(prefix);
    }
    selector
}

impl MockCaller {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Answers every view with `selector` with `value` as a `uint256`.
    pub fn set_view_uint(&self, selector: [u8; 4], value: U256) {
        self.state()
            .views
            .insert(selector, Bytes::from(value.to_be_bytes::<32>().to_vec()));
    }

    pub fn push_write(&self, outcome: WriteOutcome) {
        self.state().writes.push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn writes(&self) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(RecordedCall::is_write).collect()
    }

    /// Hash the mock assigns to its `n`th write, starting at 1.
    pub fn tx_hash(&self, n: u64) -> B256 {
        keccak256([self.address.as_slice(), n.to_be_bytes().as_slice()].concat())
    }
}

#[async_trait]
impl ContractCaller for MockCaller {
    fn address(&self) -> Address {
        self.address
    }

    async fn view(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ContractCallError> {
        let mut state = self.state();
        let answer = state
            .views
            .get(&selector(&calldata))
            .cloned()
            .unwrap_or_else(|| Bytes::from(vec![0u8; 32]));
        state.calls.push(RecordedCall {
            contract,
            calldata,
            note: None,
        });
        Ok(answer)
    }

    async fn call_contract(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<Submission, ContractCallError> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            contract,
            calldata,
            note: Some(note.to_string()),
        });
        let outcome = state.writes.pop_front().unwrap_or(WriteOutcome::Confirm);
        state.nonce += 1;
        let tx_hash = self.tx_hash(state.nonce);
        let block_number = Some(state.nonce);
        match outcome {
            WriteOutcome::Confirm => Ok(Submission::Confirmed {
                tx_hash,
                block_number,
                logs: vec![],
            }),
            WriteOutcome::ConfirmWithMessage(message) => Ok(Submission::Confirmed {
                tx_hash,
                block_number,
                logs: vec![Log {
                    address: contract,
                    data: MessageSent { message }.encode_log_data(),
                }],
            }),
            WriteOutcome::TimeOut => Ok(Submission::TimedOut { tx_hash }),
            WriteOutcome::Revert(reason) => Err(ContractCallError::Reverted {
                tx_hash: None,
                reason: Some(reason),
            }),
            WriteOutcome::TransportFailure(reason) => Err(ContractCallError::Transport(reason)),
        }
    }
}
