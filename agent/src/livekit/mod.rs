//! LiveKit integration: the RPC transport seam, the live room adapter, join
//! tokens, and the RPC methods the agent exposes to the frontend.

pub mod methods;
mod room;
mod rpc;
mod token;

pub use methods::{TOGGLE_COMPONENT_METHOD, handle_toggle_component};
pub use room::LiveKitRoom;
pub use rpc::{
    RPC_GUARD_MARGIN, RoomRpc, RpcCallError, RpcRequest, perform_with_deadline,
    select_participant,
};
pub use token::{DEFAULT_TOKEN_TTL, TokenIssuer};
