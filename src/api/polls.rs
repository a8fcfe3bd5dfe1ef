use log::info;
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    model::{
        poll::{PollSpec, PollView},
        store::{PollStore, SharedPollStore},
    },
};

pub fn routes() -> Vec<Route> {
    routes![create_poll, get_poll]
}

#[post("/polls", data = "<spec>", format = "json")]
async fn create_poll(
    spec: Json<PollSpec>,
    store: &State<SharedPollStore>,
) -> Result<Json<PollView>> {
    let poll = spec.into_inner().into_poll()?;
    store.insert(&poll).await?;
    info!(
        "Created poll '{}' with {} options",
        poll.callback_id,
        poll.options.len()
    );
    Ok(Json(poll.into()))
}

#[get("/polls/<callback_id>")]
async fn get_poll(callback_id: &str, store: &State<SharedPollStore>) -> Result<Json<PollView>> {
    let (poll, _) = store.fetch(callback_id).await?;
    Ok(Json(poll.into()))
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
        serde::json::serde_json,
    };

    use crate::model::{poll::VoteMode, store::MemoryPollStore};

    use super::*;

    async fn create(client: &Client, spec: &PollSpec) -> PollView {
        let response = client
            .post(uri!(create_poll))
            .header(ContentType::JSON)
            .body(serde_json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json().await.unwrap()
    }

    #[backend_test]
    async fn create_and_get(client: Client, store: MemoryPollStore) {
        let spec = PollSpec::example();
        let created = create(&client, &spec).await;
        assert_eq!(created.question, spec.question);
        assert_eq!(created.mode, VoteMode::Single);
        assert_eq!(created.total_voters, 0);
        assert_eq!(created.options.len(), 3);
        assert!(created.options.iter().all(|o| o.count == 0));

        let (stored, _) = store.fetch(&created.callback_id).await.unwrap();
        assert_eq!(PollView::from(stored), created);

        let response = client
            .get(uri!(get_poll(created.callback_id.as_str())))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let fetched: PollView = response.into_json().await.unwrap();
        assert_eq!(fetched, created);
    }

    #[backend_test]
    async fn create_rejects_bad_spec(client: Client, store: MemoryPollStore) {
        let mut spec = PollSpec::example();
        spec.options.clear();
        let response = client
            .post(uri!(create_poll))
            .header(ContentType::JSON)
            .body(serde_json::to_string(&spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::BadRequest, response.status());
        assert!(store.is_empty().await);
    }

    #[backend_test(seeded)]
    async fn get_missing_poll(client: Client) {
        let response = client.get(uri!(get_poll("nope"))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());

        let response = client
            .get(uri!(get_poll("example-callback")))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
    }
}
