//! Data models
//!
//! This module contains the data structures used throughout the Karibu
//! backend. Models represent:
//! - Database entities (Post, Category, Tag, Comment, Inquiry)
//! - Read-model projections (TourRank, RecentBooking, RecentReview)
//! - Display DTOs returned by the services (PostView, DashboardReport)

mod activity;
mod booking;
mod comment;
mod contact;
mod post;
mod review;
mod stats;
mod taxonomy;
mod tour;

pub use activity::{ActivityEvent, ActivityKind};
pub use booking::{BookingStatus, MonthlyPoint, RecentBooking, TourRank};
pub use comment::{Comment, CommentStatus, CommentView};
pub use contact::Inquiry;
pub use post::{PageParams, Post, PostPage, PostQuery, PostRecord, PostStatus, PostView};
pub use review::RecentReview;
pub use stats::{
    percent_delta, DashboardReport, RankedTour, ReportWindow, SiteTotals, StatDelta, StatLine,
};
pub use taxonomy::{
    AuthorRef, Category, CategoryRef, CategoryWithCount, Tag, TagRef, TagWithCount,
};
pub use tour::TourSummary;
