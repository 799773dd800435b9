pub mod config;
pub mod dataset;
pub mod descriptor;
pub mod envelope;
pub mod error;
pub mod http;
pub mod request;
pub mod resource;
pub mod router;
pub mod serializer;
pub mod telemetry;

pub use config::{ConfigError, ConfigValue, FromConfigValue, RestConfig};
pub use dataset::{DataFilters, Dataset, Item};
pub use descriptor::{ResourceDescriptor, ALL_METHODS};
pub use envelope::Envelope;
pub use error::HttpError;
pub use request::RequestContext;
pub use resource::{BaseResource, Resource};
pub use router::resource_router;
pub use serializer::{FieldSerializer, JsonSerializer, Operation, SerializeError, Serializer, Serializers};
pub use telemetry::{init_tracing, try_init_tracing};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::http::{Json, Method, Router, StatusCode};
    pub use crate::{
        resource_router, BaseResource, DataFilters, Dataset, Envelope, FieldSerializer,
        HttpError, JsonSerializer, Operation, RequestContext, Resource, ResourceDescriptor,
        Serializer,
    };
}
