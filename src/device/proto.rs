//! Wire messages for the device's gRPC API. Only the fields the canary uses are declared;
//! unknown fields in responses are skipped by prost.

pub const AUTHENTICATE_PATH: &str = "/proto.rpc.v1.AuthService/Authenticate";
pub const GET_GPIO_PATH: &str = "/viam.component.board.v1.BoardService/GetGPIO";
pub const SET_GPIO_PATH: &str = "/viam.component.board.v1.BoardService/SetGPIO";

pub const API_KEY_CREDENTIAL: &str = "api-key";

#[derive(Clone, PartialEq, prost::Message)]
pub struct Credentials {
    #[prost(string, tag = "1")]
    pub r#type: String,
    #[prost(string, tag = "2")]
    pub payload: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthenticateRequest {
    #[prost(string, tag = "1")]
    pub entity: String,
    #[prost(message, optional, tag = "2")]
    pub credentials: Option<Credentials>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AuthenticateResponse {
    #[prost(string, tag = "1")]
    pub access_token: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetGpioRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub pin: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetGpioResponse {
    #[prost(bool, tag = "1")]
    pub high: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SetGpioRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub pin: String,
    #[prost(bool, tag = "3")]
    pub high: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SetGpioResponse {}
