use serde::{Deserialize, Serialize};

use crate::{
    domain::AlbumId,
    error::{GraphqlError, GraphqlException},
};

pub const ALBUM_PAGE_OPERATION: &str = "albumViewSingleAlbum";

pub const ALBUM_PAGE_QUERY: &str = r#"query albumViewSingleAlbum($albumID: ID!, $limit: Int!, $offset: Int!) {
  album(id: $albumID) {
    id
    title
    subAlbums {
      id
      title
      thumbnail {
        thumbnail {
          url
        }
      }
    }
    media(
      paginate: { limit: $limit, offset: $offset }
      order: { order_by: "date_shot", order_direction: ASC }
    ) {
      id
      blurhash
      thumbnail {
        url
        width
        height
      }
      favorite
    }
  }
}"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest<V> {
    pub operation_name: String,
    pub query: String,
    pub variables: V,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumPageVariables {
    #[serde(rename = "albumID")]
    pub album_id: AlbumId,
    pub limit: u32,
    pub offset: u32,
}

impl GraphqlRequest<AlbumPageVariables> {
    pub fn album_page(album_id: AlbumId, limit: u32, offset: u32) -> Self {
        Self {
            operation_name: ALBUM_PAGE_OPERATION.to_string(),
            query: ALBUM_PAGE_QUERY.to_string(),
            variables: AlbumPageVariables {
                album_id,
                limit,
                offset,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

impl<T> GraphqlResponse<T> {
    /// Errors win over data; a partial response with errors is treated as failed.
    pub fn into_result(self) -> Result<Option<T>, GraphqlException> {
        if !self.errors.is_empty() {
            return Err(GraphqlException::new(self.errors));
        }
        Ok(self.data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumPageData {
    pub album: Option<AlbumPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPayload {
    pub id: AlbumId,
    pub title: String,
    #[serde(default)]
    pub sub_albums: Vec<SubAlbumPayload>,
    /// Media records stay untyped here; the client decodes them.
    #[serde(default)]
    pub media: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAlbumPayload {
    pub id: AlbumId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<SubAlbumThumbnail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubAlbumThumbnail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ThumbnailUrl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailUrl {
    pub url: String,
}

impl SubAlbumPayload {
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail
            .as_ref()
            .and_then(|thumb| thumb.thumbnail.as_ref())
            .map(|thumb| thumb.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn album_page_request_uses_graphql_variable_names() {
        let request = GraphqlRequest::album_page(AlbumId::from("42"), 200, 400);
        let value = serde_json::to_value(&request).expect("serialize");

        assert_eq!(value["operationName"], ALBUM_PAGE_OPERATION);
        assert_eq!(value["variables"]["albumID"], "42");
        assert_eq!(value["variables"]["limit"], 200);
        assert_eq!(value["variables"]["offset"], 400);
    }

    #[test]
    fn numeric_ids_are_normalised_to_strings() {
        let payload: AlbumPayload = serde_json::from_value(json!({
            "id": 7,
            "title": "Holiday",
            "subAlbums": [{ "id": "8", "title": "Day one" }],
            "media": []
        }))
        .expect("album payload");

        assert_eq!(payload.id, AlbumId::from("7"));
        assert_eq!(payload.sub_albums[0].id.as_str(), "8");
        assert!(payload.sub_albums[0].thumbnail_url().is_none());
    }

    #[test]
    fn errors_take_precedence_over_data() {
        let response: GraphqlResponse<AlbumPageData> = serde_json::from_value(json!({
            "data": { "album": null },
            "errors": [{ "message": "unauthorized" }]
        }))
        .expect("response");

        let err = response.into_result().expect_err("must fail");
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("unauthorized"));
    }

    #[test]
    fn null_album_is_not_an_error() {
        let response: GraphqlResponse<AlbumPageData> =
            serde_json::from_value(json!({ "data": { "album": null } })).expect("response");

        let data = response.into_result().expect("ok").expect("data");
        assert!(data.album.is_none());
    }
}
