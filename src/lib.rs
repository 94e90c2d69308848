//! Incrementally maintained filtered views
//!
//! A [`FilteredCollection`] shows, in source order, exactly those items of an
//! observable vector that satisfy a predicate. Every single-item edit of the
//! source is translated into at most one change of the filtered view
//! through a table of source-to-filtered positions, without re-filtering.
//!
//! Changes to the filtered view are published as [`ListDiff`](view::list::ListDiff)
//! messages on its port, so further observers and projections can be stacked on top.
//! Items that announce their own changes (see [`ObservableItem`]) can move in and
//! out of the view without any structural edit of the source.
//!
//!# Examples
//!
//! ```
//! use filtered_view::buffer::vec::*;
//!
//! let mut buffer = VecBuffer::<i32>::new();
//! buffer.push(3).unwrap();
//! buffer.push(4).unwrap();
//!
//! let evens = buffer.get_port().filter_list(|x: &i32| x % 2 == 0);
//! assert_eq!(evens.to_vec(), vec![4]);
//!
//! buffer.push(6).unwrap();   // passes, appended
//! buffer.insert(0, 2).unwrap(); // passes, becomes first
//! buffer.push(7).unwrap();   // filtered out
//!
//! assert_eq!(evens.to_vec(), vec![2, 4, 6]);
//! assert_eq!(evens.get(0), Ok(2));
//! ```

pub mod view;
pub mod buffer;
pub mod projection;
pub mod collection;
pub mod config;
pub mod error;

pub use {
    collection::FilteredCollection,
    config::{FilterConfig, ResetPolicy},
    error::{Error, Result},
    projection::item_changes::ObservableItem,
};
