use log::{error, info, warn};
use rocket::{form::Form, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        action::{Action, ActionResponse},
        poll::{cast_vote, VoteSettings},
        store::SharedPollStore,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![action]
}

/// Interactive messages arrive form encoded, with the JSON action in a
/// single field.
#[derive(Debug, FromForm)]
struct ActionForm {
    payload: Option<String>,
}

/// Handle a click on a poll button.
///
/// Always answers 200: the chat platform treats anything else as a failed
/// delivery, so failures are reported in an ephemeral message instead.
#[post("/actions", data = "<form>")]
async fn action(
    form: Form<ActionForm>,
    store: &State<SharedPollStore>,
    config: &State<Config>,
) -> Json<ActionResponse> {
    let payload = form.into_inner().payload;
    let response = match handle_action(payload, store, &config.vote_settings()).await {
        Ok(response) => response,
        Err(e) => {
            if matches!(e, Error::StoreUnavailable(_)) {
                error!("Action failed: {e}");
            } else {
                warn!("Action failed: {e}");
            }
            ActionResponse::failure(&e)
        }
    };
    Json(response)
}

async fn handle_action(
    payload: Option<String>,
    store: &SharedPollStore,
    settings: &VoteSettings,
) -> Result<ActionResponse> {
    let payload = payload.ok_or_else(|| Error::malformed("missing `payload` field"))?;
    match Action::from_payload(&payload)? {
        Action::DeletePoll => {
            info!("Poll message deletion requested");
            Ok(ActionResponse::deleted())
        }
        Action::Vote(request) => {
            let poll = cast_vote(store.as_ref(), &request, settings).await?;
            Ok(ActionResponse::poll(poll.into()))
        }
    }
}
