//! Repository layer
//!
//! Typed query primitives over the relational store, one module per
//! entity. Services depend on the traits; the `Sqlx*` implementations
//! are wired up at startup.

mod booking;
mod category;
mod comment;
mod contact;
mod customer;
mod post;
mod review;
mod tag;
mod tour;

pub use booking::{BookingRepository, SqlxBookingRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use contact::{
    InquiryRepository, SqlxInquiryRepository, SqlxSubscriberRepository, SubscriberRepository,
};
pub use customer::{CustomerRepository, SqlxCustomerRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use review::{ReviewRepository, SqlxReviewRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use tour::{SqlxTourRepository, TourRepository};
