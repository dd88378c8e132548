//! `/users` endpoints.

use reqwest::Method;
use vigil_core::user::{NewUser, User, UserUpdate};

use crate::{
  ApiClient, ClientError, Result,
  client::{Listing, read_json},
};

impl ApiClient {
  /// `GET /users`
  pub async fn list_users(&self) -> Result<Vec<User>> {
    let resp = self.send_authenticated(self.request(Method::GET, "/users")).await?;
    let listing: Listing<User> = read_json(resp).await?;
    Ok(listing.into_vec())
  }

  /// `POST /users/create`
  pub async fn create_user(&self, user: &NewUser) -> Result<()> {
    user.validate()?;
    self
      .send_authenticated(self.request(Method::POST, "/users/create").json(user))
      .await?;
    tracing::info!(username = %user.username, "user created");
    Ok(())
  }

  /// `PUT /users/{id}`
  pub async fn update_user(&self, id: u64, update: &UserUpdate) -> Result<()> {
    if *update == UserUpdate::default() {
      return Err(ClientError::Validation("Nothing to update".into()));
    }
    self
      .send_authenticated(self.request(Method::PUT, &format!("/users/{id}")).json(update))
      .await?;
    Ok(())
  }

  /// `DELETE /users/{id}`
  pub async fn delete_user(&self, id: u64) -> Result<()> {
    self
      .send_authenticated(self.request(Method::DELETE, &format!("/users/{id}")))
      .await?;
    tracing::info!(user_id = id, "user deleted");
    Ok(())
  }
}
