//! Release registration
//!
//! Publishes one version of a package into the channel:
//!
//! 1. Find the staged archive (`<temp>/<pkg>-<version>.tgz` or `--file`)
//! 2. Record the version in the package index under its stability tier
//! 3. Refuse versions already present in the package's release history
//! 4. Stamp the archive's `package.xml` with the version (and default notes)
//! 5. Move the archive into `<channel>/<pkg>/<version>/` next to its descriptor
//! 6. Write `releases.xml`, then `packages.xml`
//!
//! Steps 1-4 happen in memory ([`Registrar::plan`]); only step 5 onward writes.

pub mod registrar;

pub use registrar::{Registrar, RegistrationPlan, RegistrationRequest};
