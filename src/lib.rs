//! # Timed Text Core: A Format-Agnostic Document Model and ISD Resolution Engine
//!
//! This crate provides the temporal document model shared by timed-text
//! (captioning/subtitling) format converters, plus the engine that resolves it
//! into Intermediate Synchronic Documents (ISDs): fully cascaded, pruned,
//! presentation-ready snapshots of the document at a single instant.
//!
//! Format readers populate a [`model::ContentDocument`]; the ISD layer then
//! offers three entry points, usually called in this order or through the
//! sequence convenience call:
//!
//! - [`Isd::significant_times`]: every instant at which the ISD can change.
//! - [`Isd::from_model`]: the resolved snapshot for one instant.
//! - [`Isd::generate_isd_sequence`]: one ISD per significant time, optionally
//!   computed in parallel — `from_model` never mutates the shared document,
//!   so fan-out over offsets is safe and both paths produce identical output.
//!
//! Time arithmetic is exact (rational), style resolution follows a fixed
//! cascade (specified value → inheritance → region default → document initial
//! value → intrinsic default) driven by a static per-property metadata table,
//! and subtrees without presentable content are pruned from every snapshot.
//!
//! ## Example
//!
//! ```rust
//! use timedtext_core::model::{ContentDocument, ElementKind, Timing};
//! use timedtext_core::{Isd, TimeOffset};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut doc = ContentDocument::new();
//!     let region = doc.create_element(ElementKind::Region { id: "bottom".to_string() });
//!     doc.put_region(region)?;
//!     let body = doc.create_element(ElementKind::Body);
//!     doc.set_body(body)?;
//!
//!     let p = doc.create_element(ElementKind::P);
//!     {
//!         let p_mut = doc.get_mut(p).unwrap();
//!         p_mut.set_region_ref("bottom");
//!         p_mut.set_timing(Timing {
//!             begin: Some(TimeOffset::from_seconds(1)),
//!             end: Some(TimeOffset::from_seconds(4)),
//!             ..Timing::default()
//!         });
//!     }
//!     doc.append_child(body, p)?;
//!     let text = doc.create_element(ElementKind::Text { text: "Hello   world".to_string() });
//!     doc.append_child(p, text)?;
//!     doc.collapse_whitespace();
//!
//!     // The ISD can only change at 0s (region), 1s and 4s (paragraph).
//!     let times = Isd::significant_times(&doc);
//!     assert_eq!(times.len(), 3);
//!
//!     let isd = Isd::from_model(&doc, TimeOffset::from_seconds(2));
//!     let region = isd.region("bottom").unwrap();
//!     assert_eq!(region.contents()[0].collect_text(), "Hello world");
//!
//!     let sequence = Isd::generate_isd_sequence(&doc, true);
//!     assert_eq!(sequence.len(), 3);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod io;
pub mod isd;
pub mod model;
pub mod style;
pub mod time;
pub mod timing;

pub use config::{
    FilterFlags, FilterPipelineOptions, IsdGenerationOptions, TextWriterOptions, Validate,
};
pub use error::{ConfigError, ConvertError};
pub use io::{DocumentReader, InputSource, IsdWriter, ProgressSink, TimedTextFormat};
pub use isd::{Isd, IsdElement, IsdElementKind, IsdRegion};
pub use style::property::{ElementKinds, StyleProperty};
pub use style::value::StyleValue;
pub use time::{TimeInterval, TimeOffset};
pub use timing::{compute_active_interval, ResolvedTiming};
