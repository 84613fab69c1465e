//! Idempotent directory setup.
//!
//! Each helper probes first and only writes what is missing, so running the
//! same setup twice issues no mutations the second time.

use crate::client::DirectoryClient;
use crate::error::{DirectoryError, DirectoryResult};
use crate::model::{Facet, ObjectSelector, TypedLinkFacet};
use std::collections::{BTreeMap, BTreeSet};

impl DirectoryClient {
    /// Whether an enabled directory with `directory_arn` is visible to the
    /// credential.
    pub async fn directory_exists(&self, directory_arn: &str) -> DirectoryResult<bool> {
        Ok(self
            .list_all_directories(None)
            .await?
            .iter()
            .any(|directory| directory.directory_arn == directory_arn))
    }

    /// Fail unless the configured directory exists.
    pub async fn require_directory(&self) -> DirectoryResult<()> {
        if self.directory_exists(self.directory_arn()).await? {
            Ok(())
        } else {
            Err(DirectoryError::config(format!(
                "no directory with ARN {}",
                self.directory_arn()
            )))
        }
    }

    /// Create `facet` unless a facet of that name exists. Returns whether it
    /// was created.
    pub async fn ensure_facet(&self, facet: &Facet) -> DirectoryResult<bool> {
        if self.get_facet(&facet.name).await?.is_some() {
            return Ok(false);
        }
        self.create_facet(facet).await?;
        Ok(true)
    }

    /// Add the optional string attributes in `attribute_names` that `facet_name`
    /// does not define yet. Returns the names that were added.
    pub async fn ensure_facet_attributes<S: AsRef<str>>(
        &self,
        facet_name: &str,
        attribute_names: &[S],
    ) -> DirectoryResult<Vec<String>> {
        let existing: BTreeSet<String> = self
            .list_all_facet_attributes(facet_name, None)
            .await?
            .iter()
            .filter_map(|attr| attr["Name"].as_str().map(str::to_string))
            .collect();

        let missing: Vec<String> = attribute_names
            .iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| !existing.contains(name))
            .collect();
        if !missing.is_empty() {
            self.update_facet(facet_name, missing.as_slice()).await?;
            log::debug!("Added attributes {:?} to facet {}", missing, facet_name);
        }
        Ok(missing)
    }

    /// Create `facet` unless a typed link facet of that name exists.
    pub async fn ensure_typed_link_facet(&self, facet: &TypedLinkFacet) -> DirectoryResult<bool> {
        if self
            .get_typed_link_facet_information(&facet.name)
            .await?
            .is_some()
        {
            return Ok(false);
        }
        self.create_typed_link_facet(facet).await?;
        Ok(true)
    }

    /// Make sure every node on `path` exists, creating missing ones from the
    /// top down with `facet_name` and `name_attribute` set to the link name.
    /// Returns the selectors that were created.
    pub async fn ensure_object_path(
        &self,
        path: &ObjectSelector,
        facet_name: &str,
        name_attribute: &str,
    ) -> DirectoryResult<Vec<ObjectSelector>> {
        if path.is_identifier() {
            return Err(DirectoryError::config(format!(
                "cannot create objects along identifier selector {}",
                path
            )));
        }
        let mut created = Vec::new();
        for node in path.prefixes() {
            if self.get_object_information(&node).await?.is_some() {
                continue;
            }
            let Some((parent, name)) = node.parent_and_name() else {
                continue;
            };
            let mut attributes = BTreeMap::new();
            attributes.insert(name_attribute.to_string(), name.clone());
            self.create_object(&name, facet_name, &parent, &attributes)
                .await?;
            log::debug!("Created object {}", node);
            created.push(node);
        }
        Ok(created)
    }
}
