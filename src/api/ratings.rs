// src/api/ratings.rs
use super::{keyed_or_data, path_id};
use crate::core::http_client::{ApiRequest, HttpClient};
use crate::error::ApiError;
use crate::types::rating::{NewRating, Rating};

pub struct RatingsApi<'a> {
    client: &'a dyn HttpClient,
}

impl<'a> RatingsApi<'a> {
    pub fn new(client: &'a dyn HttpClient) -> Self {
        Self { client }
    }

    pub async fn create(&self, rating: &NewRating) -> Result<Rating, ApiError> {
        let response = self
            .client
            .send(ApiRequest::post("/ratings").json(rating)?)
            .await?;
        keyed_or_data(&response, "rating")
    }

    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<Rating>, ApiError> {
        let user_id = path_id("userId", user_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/ratings/user/{}", user_id)))
            .await?;
        Ok(response.list())
    }

    /// Both parties may rate the same application.
    pub async fn get_for_application(&self, application_id: &str) -> Result<Vec<Rating>, ApiError> {
        let application_id = path_id("applicationId", application_id)?;
        let response = self
            .client
            .send(ApiRequest::get(format!("/ratings/application/{}", application_id)))
            .await?;
        Ok(response.list())
    }
}
