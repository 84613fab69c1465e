//! Routing table for the Cloud Directory REST actions.
//!
//! Reads are POSTs whose body only filters; mutations are PUTs. Every action
//! is partitioned by either the directory ARN (object and link data) or the
//! schema ARN (facet data), except the account-wide directory listing.

use reqwest::Method;
use std::fmt;

pub const HOST_HEADER: &str = "host";
pub const PARTITION_HEADER: &str = "x-amz-data-partition";
pub const CONSISTENCY_LEVEL_HEADER: &str = "x-amz-consistency-level";
pub const SERIALIZABLE: &str = "SERIALIZABLE";

/// Which ARN goes into the partition header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    None,
    Directory,
    Schema,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDirectories,
    ListObjectChildren,
    ListObjectAttributes,
    ListFacetAttributes,
    ListIncomingTypedLinks,
    ListOutgoingTypedLinks,
    GetObjectInformation,
    GetFacet,
    GetTypedLinkFacetInformation,
    CreateObject,
    CreateFacet,
    UpdateFacet,
    CreateTypedLinkFacet,
    AttachTypedLink,
    DetachTypedLink,
    UpdateObjectAttributes,
    DetachObject,
    DeleteObject,
    BatchWrite,
}

impl Operation {
    pub const ALL: [Operation; 19] = [
        Self::ListDirectories,
        Self::ListObjectChildren,
        Self::ListObjectAttributes,
        Self::ListFacetAttributes,
        Self::ListIncomingTypedLinks,
        Self::ListOutgoingTypedLinks,
        Self::GetObjectInformation,
        Self::GetFacet,
        Self::GetTypedLinkFacetInformation,
        Self::CreateObject,
        Self::CreateFacet,
        Self::UpdateFacet,
        Self::CreateTypedLinkFacet,
        Self::AttachTypedLink,
        Self::DetachTypedLink,
        Self::UpdateObjectAttributes,
        Self::DetachObject,
        Self::DeleteObject,
        Self::BatchWrite,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ListDirectories => "ListDirectories",
            Self::ListObjectChildren => "ListObjectChildren",
            Self::ListObjectAttributes => "ListObjectAttributes",
            Self::ListFacetAttributes => "ListFacetAttributes",
            Self::ListIncomingTypedLinks => "ListIncomingTypedLinks",
            Self::ListOutgoingTypedLinks => "ListOutgoingTypedLinks",
            Self::GetObjectInformation => "GetObjectInformation",
            Self::GetFacet => "GetFacet",
            Self::GetTypedLinkFacetInformation => "GetTypedLinkFacetInformation",
            Self::CreateObject => "CreateObject",
            Self::CreateFacet => "CreateFacet",
            Self::UpdateFacet => "UpdateFacet",
            Self::CreateTypedLinkFacet => "CreateTypedLinkFacet",
            Self::AttachTypedLink => "AttachTypedLink",
            Self::DetachTypedLink => "DetachTypedLink",
            Self::UpdateObjectAttributes => "UpdateObjectAttributes",
            Self::DetachObject => "DetachObject",
            Self::DeleteObject => "DeleteObject",
            Self::BatchWrite => "BatchWrite",
        }
    }

    /// Path below `/amazonclouddirectory/<api_version>`.
    pub fn path(&self) -> &'static str {
        match self {
            Self::ListDirectories => "/directory/list",
            Self::ListObjectChildren => "/object/children",
            Self::ListObjectAttributes => "/object/attributes",
            Self::ListFacetAttributes => "/facet/attributes",
            Self::ListIncomingTypedLinks => "/typedlink/incoming",
            Self::ListOutgoingTypedLinks => "/typedlink/outgoing",
            Self::GetObjectInformation => "/object/information",
            Self::GetFacet => "/facet",
            Self::GetTypedLinkFacetInformation => "/typedlink/facet/get",
            Self::CreateObject => "/object",
            Self::CreateFacet => "/facet/create",
            Self::UpdateFacet => "/facet",
            Self::CreateTypedLinkFacet => "/typedlink/facet/create",
            Self::AttachTypedLink => "/typedlink/attach",
            Self::DetachTypedLink => "/typedlink/detach",
            Self::UpdateObjectAttributes => "/object/update",
            Self::DetachObject => "/object/detach",
            Self::DeleteObject => "/object/delete",
            Self::BatchWrite => "/batchwrite",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(
            self,
            Self::ListDirectories
                | Self::ListObjectChildren
                | Self::ListObjectAttributes
                | Self::ListFacetAttributes
                | Self::ListIncomingTypedLinks
                | Self::ListOutgoingTypedLinks
                | Self::GetObjectInformation
                | Self::GetFacet
                | Self::GetTypedLinkFacetInformation
        )
    }

    pub fn method(&self) -> Method {
        if self.is_read() {
            Method::POST
        } else {
            Method::PUT
        }
    }

    pub fn partition(&self) -> Partition {
        match self {
            Self::ListDirectories => Partition::None,
            Self::ListFacetAttributes
            | Self::GetFacet
            | Self::GetTypedLinkFacetInformation
            | Self::CreateFacet
            | Self::UpdateFacet
            | Self::CreateTypedLinkFacet => Partition::Schema,
            _ => Partition::Directory,
        }
    }

    /// Reads that must observe the latest committed write.
    pub fn is_serializable(&self) -> bool {
        matches!(
            self,
            Self::ListObjectChildren | Self::ListObjectAttributes | Self::GetObjectInformation
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
