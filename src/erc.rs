use {
    alloy_primitives::{Address, Bytes, U256},
    alloy_sol_types::{SolCall, sol},
};

sol! {
    #[allow(missing_docs)]
    interface ERC20 {
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }

    /// Settlement contract paying several recipients of one token in a
    /// single transaction, pulling funds from the caller's allowance.
    #[allow(missing_docs)]
    interface PayoutRouter {
        function batchPayout(address token, address[] recipients, uint256[] amounts) external;
    }
}

pub fn balance_of_calldata(account: Address) -> Bytes {
    ERC20::balanceOfCall { account }.abi_encode().into()
}

pub fn allowance_calldata(owner: Address, spender: Address) -> Bytes {
    ERC20::allowanceCall { owner, spender }.abi_encode().into()
}

pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    ERC20::approveCall { spender, amount }.abi_encode().into()
}

pub fn batch_payout_calldata(token: Address, recipients: Vec<Address>, amounts: Vec<U256>) -> Bytes {
    PayoutRouter::batchPayoutCall {
        token,
        recipients,
        amounts,
    }
    .abi_encode()
    .into()
}
