//! Realtime booking notifications through the Pusher HTTP trigger API.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use festival_coordination_config::PusherConfig;
use festival_coordination_database::convert::{AartiSlotRef, AartiSubmission};
use hmac::{Hmac, Mac};
use http::{header, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::rt::TokioIo;
use md5::{Digest, Md5};
use serde::Serialize;
use sha2::Sha256;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::{InvalidDnsNameError, ServerName};
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_VERSION: &str = "1.0";

#[derive(thiserror::Error, Debug)]
pub enum NotificationError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pusher host: {0}")]
    DnsName(#[from] InvalidDnsNameError),
    #[error("hyper error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("http error: {0}")]
    Http(#[from] http::Error),
    #[error("failed to encode notification: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid pusher secret")]
    Secret(#[from] hmac::digest::InvalidLength),
    #[error("pusher answered {status}: {body}")]
    Rejected { status: StatusCode, body: String },
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookingNotification {
    pub aarti_schedule: AartiSlotRef,
    pub building: String,
    pub flat: String,
    pub user_name: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl BookingNotification {
    #[must_use]
    pub fn for_booking(booking: &AartiSubmission, timestamp: DateTime<Utc>) -> Self {
        Self {
            message: format!(
                "{} booked the {} aarti on {} for flat {}",
                booking.user_name,
                booking.aarti_schedule.time.to_lowercase(),
                booking.aarti_schedule.date,
                booking.flat
            ),
            aarti_schedule: booking.aarti_schedule.clone(),
            building: booking.building.clone(),
            flat: booking.flat.clone(),
            user_name: booking.user_name.clone(),
            timestamp,
        }
    }
}

#[derive(Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channels: [&'a str; 1],
    data: String,
}

/// The trigger request body. Pusher wants `data` as a JSON encoded string.
pub fn trigger_body(
    pusher: &PusherConfig,
    notification: &BookingNotification,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&TriggerBody {
        name: &pusher.event,
        channels: [&pusher.channel],
        data: serde_json::to_string(notification)?,
    })
}

/// Path and signed query string for a trigger request. The parameters are in
/// lexicographic order, which is also the order they are signed in.
pub fn signed_path(
    pusher: &PusherConfig,
    body: &str,
    auth_timestamp: i64,
) -> Result<String, NotificationError> {
    let path = format!("/apps/{}/events", pusher.app_id);
    let body_md5 = format!("{:x}", Md5::digest(body.as_bytes()));
    let query = format!(
        "auth_key={}&auth_timestamp={auth_timestamp}&auth_version={AUTH_VERSION}&body_md5={body_md5}",
        pusher.key
    );
    let mut mac = HmacSha256::new_from_slice(pusher.secret.as_bytes())?;
    mac.update(format!("POST\n{path}\n{query}").as_bytes());
    let signature = format!("{:x}", mac.finalize().into_bytes());
    Ok(format!("{path}?{query}&auth_signature={signature}"))
}

#[derive(Clone, Default)]
pub struct Notifier {
    pusher: Option<PusherConfig>,
    tls: Option<Arc<ClientConfig>>,
}

impl Notifier {
    #[must_use]
    pub fn new(pusher: Option<PusherConfig>) -> Self {
        let tls = pusher.as_ref().map(|_| {
            let mut root_cert_store = RootCertStore::empty();
            root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            Arc::new(
                ClientConfig::builder()
                    .with_root_certificates(root_cert_store)
                    .with_no_client_auth(),
            )
        });
        if pusher.is_none() {
            info!("pusher is not configured, booking notifications are disabled");
        }
        Self { pusher, tls }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.pusher.is_some()
    }

    /// Publishes one notification per booking. Failures are logged only.
    pub async fn notify_bookings<'a, I>(&self, bookings: I)
    where
        I: IntoIterator<Item = &'a AartiSubmission>,
    {
        if !self.is_enabled() {
            return;
        }
        let now = Utc::now();
        for booking in bookings {
            let notification = BookingNotification::for_booking(booking, now);
            if let Err(err) = self.publish(&notification).await {
                warn!("failed to publish booking notification for {}: {err}", booking.flat);
            }
        }
    }

    pub async fn publish(&self, notification: &BookingNotification) -> Result<(), NotificationError> {
        let (Some(pusher), Some(tls)) = (&self.pusher, &self.tls) else {
            debug!("skipping notification, pusher is not configured");
            return Ok(());
        };
        let body = trigger_body(pusher, notification)?;
        let path = signed_path(pusher, &body, Utc::now().timestamp())?;
        let host = format!("api-{}.pusher.com", pusher.cluster);

        let connector = TlsConnector::from(Arc::clone(tls));
        let server_name = ServerName::try_from(host.clone())?;
        let stream = TcpStream::connect((host.as_str(), 443)).await?;
        let stream = connector.connect(server_name, stream).await?;

        let (mut sender, connection) =
            hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                debug!("pusher connection closed: {err}");
            }
        });

        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(header::HOST, host)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Full::new(Bytes::from(body)))?;
        let response = sender.send_request(request).await?;
        let status = response.status();
        if status.is_success() {
            debug!("published booking notification for {}", notification.flat);
            return Ok(());
        }
        let body = response.into_body().collect().await?.to_bytes();
        Err(NotificationError::Rejected {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
