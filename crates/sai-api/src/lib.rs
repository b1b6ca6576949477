//! Typed access to a SAI (Switch Abstraction Interface) adapter.
//!
//! This crate is the hardware boundary of the control plane:
//!
//! - [`types`]: type-safe object ids and object types
//! - [`attribute`]: attribute values plus the attribute, enum and counter ids in use
//! - [`error`]: status codes and [`SaiError`]
//! - [`api`]: the [`SaiApi`] trait every adapter implements
//! - [`fake`]: [`FakeSai`], an in-memory adapter
//!
//! # Example
//!
//! ```
//! use sai_api::attribute::{port, SaiAttribute, SaiAttributeValue};
//! use sai_api::{FakeSai, SaiApi, SaiObjectType};
//!
//! let sai = FakeSai::new();
//! let lanes = SaiAttribute::new(port::HW_LANE_LIST, SaiAttributeValue::U32List(vec![1, 2]));
//! let port = sai.create(SaiObjectType::Port, &[lanes]).unwrap();
//! assert_eq!(SaiObjectType::query(port), Some(SaiObjectType::Port));
//! ```

pub mod api;
pub mod attribute;
pub mod error;
pub mod fake;
pub mod types;

pub use api::{SaiApi, SaiApiExt, SaiOperation};
pub use attribute::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiStatId};
pub use error::{SaiError, SaiResult, SaiStatus};
pub use fake::{FakeSai, SaiCall};
pub use types::{RawSaiObjectId, SaiObjectId, SaiObjectKind, SaiObjectType, SAI_NULL_OBJECT_ID};
