//! Wiring for the real game server: REST client, realtime client, and the
//! coordinator on top of them.

use std::sync::Arc;

use rengo_protocol::Color;
use rengo_session::{CredentialStore, SessionBroker};
use rengo_transport::{RealtimeClient, RestClient};

use crate::{Coordinator, GameController, RengoError, Settings};

/// A coordinator talking to the real server.
pub type OnlineCoordinator<S> = Coordinator<RestClient, S, RealtimeClient>;

/// The REST client described by `settings`.
pub fn rest_client(settings: &Settings) -> Result<Arc<RestClient>, RengoError> {
    let api = &settings.api;
    if !api.has_client_credentials() {
        return Err(RengoError::Config(
            "api.client_id and api.client_secret must be set".into(),
        ));
    }
    let client = RestClient::new(&api.rest_url, &api.client_id, &api.client_secret)?;
    Ok(Arc::new(client))
}

/// Opens the realtime connection, authenticates both accounts on it, and
/// builds the coordinator.
///
/// `broker` must use the client from [`rest_client`] (or an equivalent
/// one) and hold an enrolled credential book.
///
/// # Errors
/// [`RengoError::Config`] if `api.realtime_url` is not set.
pub async fn connect<S: CredentialStore>(
    settings: &Settings,
    broker: SessionBroker<RestClient, S>,
) -> Result<OnlineCoordinator<S>, RengoError> {
    if !settings.api.has_realtime_url() {
        return Err(RengoError::Config(
            "api.realtime_url must point at a realtime endpoint".into(),
        ));
    }
    let realtime =
        RealtimeClient::connect(&settings.api.realtime_url, settings.realtime.clone()).await?;

    for color in Color::ALL {
        let token = broker.ensure_fresh(color).await?;
        let auth = broker.api().realtime_auth(&token).await?;
        realtime.authenticate(&auth).await?;
        tracing::info!(%color, player_id = %auth.player_id, "realtime account ready");
    }

    let controller = GameController::new(
        broker,
        Arc::new(realtime),
        settings.challenge.clone(),
        settings.settle.clone(),
    );
    Ok(Coordinator::new(controller, settings.closing_pass_enabled))
}
