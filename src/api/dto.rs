//! JSON response shapes for the HTTP query API (§6.1, §6.2). Kept separate
//! from the `model` types so a storage-layer change (new column, renamed
//! field) doesn't silently change the wire contract this crate stays
//! bit-compatible with.

use crate::model::camera::Camera;
use crate::model::photo::Photo;
use crate::model::rover::Rover;
use crate::query::PhotoPage;
use crate::time::DateTime;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, serde::Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    #[default]
    Basic,
    Extended,
    Full,
}

impl FieldSet {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldSet::Basic => "basic",
            FieldSet::Extended => "extended",
            FieldSet::Full => "full",
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct RoverAttributes {
    pub name: String,
    pub landing_date: DateTime,
    pub launch_date: DateTime,
    pub status: crate::model::enums::RoverStatus,
}

#[derive(Serialize, ToSchema)]
pub struct CameraAttributes {
    pub short_name: String,
    pub full_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct Resource<A> {
    pub id: i64,
    pub attributes: A,
}

impl Resource<RoverAttributes> {
    pub fn from_rover(rover: &Rover) -> Self {
        Resource {
            id: rover.id,
            attributes: RoverAttributes {
                name: rover.name.clone(),
                landing_date: rover.landing_date,
                launch_date: rover.launch_date,
                status: rover.status,
            },
        }
    }
}

impl Resource<CameraAttributes> {
    pub fn from_camera(camera: &Camera) -> Self {
        Resource {
            id: camera.id,
            attributes: CameraAttributes {
                short_name: camera.short_name.clone(),
                full_name: camera.full_name.clone(),
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PhotoRelationships {
    pub rover: Resource<RoverAttributes>,
    pub camera: Resource<CameraAttributes>,
}

#[derive(Serialize, ToSchema)]
pub struct Dimensions {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub aspect_ratio: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct Location {
    pub site: Option<i32>,
    pub drive: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct Telemetry {
    pub mast_az: Option<f64>,
    pub mast_el: Option<f64>,
}

#[derive(Serialize, ToSchema)]
pub struct Images {
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub full: Option<String>,
}

/// `basic` field-set attributes (§6.2). Every richer projection includes
/// these fields plus its own, never drops them.
#[derive(Serialize, ToSchema)]
pub struct PhotoAttributesBasic {
    pub sol: i32,
    pub earth_date: DateTime,
    pub img_src: String,
    pub camera_short_name: String,
    pub rover_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct PhotoAttributesExtended {
    #[serde(flatten)]
    pub basic: PhotoAttributesBasic,
    pub nasa_id: String,
    pub dimensions: Dimensions,
    pub location: Location,
    pub mars_time: Option<String>,
    pub telemetry: Telemetry,
    pub sample_type: Option<String>,
    pub images: Images,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub credit: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PhotoAttributesFull {
    #[serde(flatten)]
    pub extended: PhotoAttributesExtended,
    pub raw_data: serde_json::Value,
}

#[derive(Serialize, ToSchema)]
#[serde(untagged)]
pub enum PhotoAttributes {
    Basic(PhotoAttributesBasic),
    Extended(PhotoAttributesExtended),
    Full(PhotoAttributesFull),
}

#[derive(Serialize, ToSchema)]
pub struct PhotoResource {
    pub id: i64,
    pub attributes: PhotoAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<PhotoRelationships>,
}

/// Builds a `PhotoResource` at the requested field-set, optionally
/// embedding the `rover`/`camera` relationships (§6.1 `include`).
pub fn photo_resource(photo: &Photo, rover: &Rover, camera: &Camera, field_set: FieldSet, include_rover: bool, include_camera: bool) -> PhotoResource {
    let img_src = photo.full_url.clone().or_else(|| photo.medium_url.clone()).or_else(|| photo.thumbnail_url.clone()).unwrap_or_default();

    let basic = PhotoAttributesBasic {
        sol: photo.sol,
        earth_date: photo.earth_date,
        img_src,
        camera_short_name: camera.short_name.clone(),
        rover_name: rover.name.clone(),
    };

    let attributes = match field_set {
        FieldSet::Basic => PhotoAttributes::Basic(basic),
        FieldSet::Extended | FieldSet::Full => {
            let aspect_ratio = match (photo.width, photo.height) {
                (Some(width), Some(height)) if height != 0 => Some(f64::from(width) / f64::from(height)),
                _ => None,
            };
            let extended = PhotoAttributesExtended {
                basic,
                nasa_id: photo.external_id.clone(),
                dimensions: Dimensions {
                    width: photo.width,
                    height: photo.height,
                    aspect_ratio,
                },
                location: Location {
                    site: photo.site,
                    drive: photo.drive,
                },
                mars_time: photo.mars_local_time.clone(),
                telemetry: Telemetry {
                    mast_az: photo.mast_az,
                    mast_el: photo.mast_el,
                },
                sample_type: photo.sample_type.clone(),
                images: Images {
                    small: photo.small_url.clone(),
                    medium: photo.medium_url.clone(),
                    large: photo.full_url.clone(),
                    full: photo.full_url.clone(),
                },
                title: photo.title.clone(),
                caption: photo.caption.clone(),
                credit: photo.credit.clone(),
            };
            match field_set {
                FieldSet::Extended => PhotoAttributes::Extended(extended),
                FieldSet::Full => PhotoAttributes::Full(PhotoAttributesFull {
                    extended,
                    raw_data: photo.raw.clone(),
                }),
                FieldSet::Basic => unreachable!(),
            }
        }
    };

    let relationships = (include_rover || include_camera).then(|| PhotoRelationships {
        rover: Resource::from_rover(rover),
        camera: Resource::from_camera(camera),
    });

    PhotoResource {
        id: photo.id,
        attributes,
        relationships,
    }
}

#[derive(Serialize, ToSchema)]
pub struct Meta {
    pub total_count: i64,
    pub returned_count: usize,
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

#[derive(Serialize, ToSchema)]
pub struct Links {
    #[serde(rename = "self")]
    pub this: String,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Links {
    pub fn paged(base_path: &str, query: &str, page: i64, total_pages: i64) -> Self {
        let url = |p: i64| format!("{base_path}?{query}&page={p}");
        Links {
            this: url(page),
            previous: (page > 1).then(|| url(page - 1)),
            next: (page < total_pages).then(|| url(page + 1)),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
    pub meta: Meta,
    pub pagination: Pagination,
    pub links: Links,
}

impl ListEnvelope<PhotoResource> {
    pub fn from_page(page: PhotoPage, data: Vec<PhotoResource>, base_path: &str, query: &str) -> Self {
        let total_pages = page.total_pages();
        ListEnvelope {
            meta: Meta {
                total_count: page.total_count,
                returned_count: data.len(),
            },
            pagination: Pagination {
                page: page.page,
                per_page: page.per_page,
                total_pages,
            },
            links: Links::paged(base_path, query, page.page, total_pages),
            data,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ManifestEntryDto {
    pub sol: i32,
    pub earth_date: DateTime,
    pub count: i64,
    pub cameras: Vec<String>,
}

impl From<crate::query::ManifestEntry> for ManifestEntryDto {
    fn from(entry: crate::query::ManifestEntry) -> Self {
        ManifestEntryDto {
            sol: entry.sol,
            earth_date: entry.earth_date,
            count: entry.count,
            cameras: entry.cameras,
        }
    }
}
