pub mod rpc;
pub mod util;

pub use rpc::RpcClient;
