//! Channel metadata store
//!
//! Typed access to the documents that make up a channel:
//!
//! - **channel**: `channel.xml`, the channel's identity (read-only)
//! - **index**: `packages.xml`, latest version per package and stability tier
//! - **history**: `<pkg>/releases.xml`, every registered version of a package
//! - **descriptor**: `package.xml` embedded in each archive
//! - **xml**: the element tree all of the above parse into and render from
//!
//! The store only parses, queries, mutates and renders. It never writes; the
//! registrar decides when serialized documents reach the disk.

pub mod channel;
pub mod descriptor;
pub mod history;
pub mod index;
pub mod xml;

pub use channel::ChannelDescriptor;
pub use descriptor::PackageDescriptor;
pub use history::{ReleaseHistory, ReleaseRecord};
pub use index::{PackageIndex, PackageIndexEntry, ReleaseStabilityMap, Stability};
