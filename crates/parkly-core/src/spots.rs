// ── Parking-spot operations ──
//
// Image management and availability updates exist only for spots. Image
// changes re-fetch that one spot's detail instead of the whole list.

use parkly_api::ApiRequest;
use serde_json::json;
use tracing::info;

use crate::error::CoreError;
use crate::model::{
    AvailabilityUpdate, EntityId, NearbyQuery, NearbySpot, ParkingSpot, ParkingSpotDetail,
};
use crate::notify::Notification;
use crate::resource::{Resource, ResourceKind};
use crate::table::{Mutation, ResourceTable};

const UPLOAD_FIELD: &str = "file";

fn upload_path(id: &EntityId) -> String {
    format!("{}/upload/{id}", ResourceKind::ParkingSpots.collection_path())
}

fn delete_image_path() -> String {
    format!("{}/delete-image", ResourceKind::ParkingSpots.collection_path())
}

impl ResourceTable<ParkingSpot> {
    /// Record plus images, reviews, cost, and rating.
    pub async fn detail(&self, id: &EntityId) -> Result<ParkingSpotDetail, CoreError> {
        let req = ApiRequest::get(ParkingSpot::KIND.item_path(id));
        Ok(self.gateway().send(req).await?)
    }

    /// Upload one image, then return the refreshed detail.
    pub async fn upload_image(
        &mut self,
        id: &EntityId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<ParkingSpotDetail, CoreError> {
        if file_name.trim().is_empty() {
            return Err(CoreError::validation("file", "a file name is required"));
        }
        if bytes.is_empty() {
            return Err(CoreError::validation("file", "the file is empty"));
        }

        let size = bytes.len();
        if let Err(e) = self
            .gateway()
            .upload(&upload_path(id), UPLOAD_FIELD, file_name, bytes)
            .await
        {
            let err = CoreError::from(e);
            self.report("Image upload failed", &err);
            return Err(err);
        }

        info!(%id, file_name, size, "image uploaded");
        self.notify(Notification::success("Image uploaded"));
        self.refreshed_detail(id).await
    }

    /// Remove an image by its stored file name, then return the refreshed detail.
    pub async fn delete_image(
        &mut self,
        id: &EntityId,
        file_name: &str,
    ) -> Result<ParkingSpotDetail, CoreError> {
        if file_name.trim().is_empty() {
            return Err(CoreError::validation("fileName", "is required"));
        }

        let req = ApiRequest::post(delete_image_path(), &json!({ "fileName": file_name }))?;
        if let Err(e) = self.gateway().request(req).await {
            let err = CoreError::from(e);
            self.report("Image was not deleted", &err);
            return Err(err);
        }

        info!(%id, file_name, "image deleted");
        self.notify(Notification::success("Image deleted"));
        self.refreshed_detail(id).await
    }

    /// Set the currently-available B and C counts, bounded by the totals.
    ///
    /// The bound is checked against the loaded record when present,
    /// otherwise against a freshly fetched one.
    pub async fn update_availability(
        &mut self,
        id: &EntityId,
        update: AvailabilityUpdate,
    ) -> Result<(), CoreError> {
        match self.find(id) {
            Some(spot) => update.check_against(spot)?,
            None => update.check_against(&self.detail(id).await?.spot)?,
        }

        let req = ApiRequest::patch(ParkingSpot::KIND.item_path(id))
            .query("bSpots", update.b_spots)
            .query("cSpots", update.c_spots);
        self.mutate(req, Mutation::Availability).await
    }

    /// Spots within `radius` kilometres of a point.
    pub async fn nearby(&self, query: NearbyQuery) -> Result<Vec<NearbySpot>, CoreError> {
        query.validate()?;
        Ok(self.gateway().list(&query.path()).await?)
    }

    async fn refreshed_detail(&mut self, id: &EntityId) -> Result<ParkingSpotDetail, CoreError> {
        match self.detail(id).await {
            Ok(detail) => Ok(detail),
            Err(err) => {
                self.report("Failed to reload spot", &err);
                Err(err)
            }
        }
    }
}
