//! Unary gRPC client for the device, on a `tonic` channel with `prost` messages.

use std::time::Duration;

use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Request, Status};
use url::Url;

use super::proto;
use super::{DeviceConnector, DeviceSession, Target, TransportError, report};

/// Connects to a device by authenticating with its API key.
#[derive(Clone)]
pub struct GrpcConnector {
    request_timeout: Duration,
}

impl GrpcConnector {
    pub fn new(request_timeout: Duration) -> Self {
        Self { request_timeout }
    }

    fn endpoint(&self, address: &str) -> Result<Endpoint, TransportError> {
        let url = Url::parse(address)
            .map_err(|e| TransportError::Request(format!("invalid address: {e}")))?;

        let mut endpoint = Endpoint::from_shared(address.to_string())?
            .timeout(self.request_timeout)
            .connect_timeout(self.request_timeout)
            .user_agent(concat!("gpio-canary/", env!("CARGO_PKG_VERSION")))?;
        if url.scheme() == "https" {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_webpki_roots())?;
        }
        Ok(endpoint)
    }
}

impl DeviceConnector for GrpcConnector {
    type Session = GrpcSession;

    async fn connect(&self, target: &Target) -> Result<GrpcSession, TransportError> {
        let channel = self.endpoint(&target.address)?.connect().await?;

        let request = proto::AuthenticateRequest {
            entity: target.credentials.api_key_id.clone(),
            credentials: Some(proto::Credentials {
                r#type: proto::API_KEY_CREDENTIAL.to_string(),
                payload: target.credentials.api_key.clone(),
            }),
        };
        let response: proto::AuthenticateResponse =
            unary(channel.clone(), proto::AUTHENTICATE_PATH, None, request).await?;

        if response.access_token.is_empty() {
            return Err(TransportError::Decode(
                "authentication returned an empty access token".to_string(),
            ));
        }

        let authorization = format!("Bearer {}", response.access_token)
            .parse::<MetadataValue<Ascii>>()
            .map_err(|_| TransportError::Decode("access token is not valid ASCII".to_string()))?;

        tracing::debug!(address = %target.address, "authenticated with device");

        Ok(GrpcSession {
            channel,
            address: target.address.clone(),
            authorization,
        })
    }
}

/// An authenticated session. Every call carries the bearer token.
pub struct GrpcSession {
    channel: Channel,
    address: String,
    authorization: MetadataValue<Ascii>,
}

impl DeviceSession for GrpcSession {
    async fn get_gpio(&self, board: &str, pin: &str) -> Result<bool, TransportError> {
        let request = proto::GetGpioRequest {
            name: board.to_string(),
            pin: pin.to_string(),
        };
        let response: proto::GetGpioResponse = unary(
            self.channel.clone(),
            proto::GET_GPIO_PATH,
            Some(&self.authorization),
            request,
        )
        .await?;
        Ok(response.high)
    }

    async fn set_gpio(&self, board: &str, pin: &str, high: bool) -> Result<(), TransportError> {
        let request = proto::SetGpioRequest {
            name: board.to_string(),
            pin: pin.to_string(),
            high,
        };
        let _: proto::SetGpioResponse = unary(
            self.channel.clone(),
            proto::SET_GPIO_PATH,
            Some(&self.authorization),
            request,
        )
        .await?;
        Ok(())
    }

    async fn close(self) -> Result<(), TransportError> {
        // Dropping the last channel handle tears down the HTTP/2 connection.
        drop(self.channel);
        tracing::debug!(address = %self.address, "device session released");
        Ok(())
    }
}

async fn unary<Req, Resp>(
    channel: Channel,
    path: &'static str,
    authorization: Option<&MetadataValue<Ascii>>,
    message: Req,
) -> Result<Resp, TransportError>
where
    Req: prost::Message + Send + Sync + 'static,
    Resp: prost::Message + Default + Send + Sync + 'static,
{
    let mut grpc = Grpc::new(channel);
    grpc.ready()
        .await
        .map_err(|e| TransportError::Request(report(&e)))?;

    let mut request = Request::new(message);
    if let Some(value) = authorization {
        request.metadata_mut().insert("authorization", value.clone());
    }

    let codec = ProstCodec::<Req, Resp>::default();
    let response = grpc
        .unary(request, PathAndQuery::from_static(path), codec)
        .await?;
    Ok(response.into_inner())
}

impl From<Status> for TransportError {
    fn from(status: Status) -> Self {
        let code = status.code() as i32;
        let message = match status.message().trim() {
            "" => format!("rpc failed with status {:?}", status.code()),
            message => message.to_string(),
        };
        TransportError::Rpc { code, message }
    }
}

impl From<tonic::transport::Error> for TransportError {
    fn from(err: tonic::transport::Error) -> Self {
        TransportError::Request(report(&err))
    }
}
