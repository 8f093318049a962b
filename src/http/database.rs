use axum::extract::State;

use crate::api;
use crate::error::AppResult;
use crate::http::{Envelope, Reply};
use crate::App;

pub async fn index(app: State<App>) -> AppResult<Reply<Vec<String>>> {
    let mut session = app.session().await?;
    let files = api::catalog(&mut session).await?;
    session.finish().await;

    Ok(Envelope::data(format!("Found {} files", files.len()), files))
}
