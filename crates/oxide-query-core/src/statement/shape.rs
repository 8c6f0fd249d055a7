//! Type-level bookkeeping of what a statement returns.
//!
//! A shape is a tuple with one element per FROM/JOIN source (while the
//! default `alias.*` projection is in force) or one element per projected
//! expression (after `select`). Its [`Shape::Row`] is what the terminals
//! decode each row into: the single element for one-element shapes, the
//! tuple itself otherwise.

/// A statement's result shape.
pub trait Shape {
    /// The decoded row type.
    type Row;
}

/// Appends `N` to a shape.
pub trait Append<N> {
    /// The grown shape.
    type Output: Shape;
}

/// Makes every element of a shape optional, as the preserved side of a
/// right or full outer join requires.
pub trait Nullable {
    /// The shape with each element wrapped in `Option`.
    type Output: Shape;
}

impl<A> Shape for (A,) {
    type Row = A;
}

macro_rules! impl_shape {
    ($($name:ident),+) => {
        impl<$($name),+> Shape for ($($name,)+) {
            type Row = Self;
        }
    };
}

impl_shape!(A, B);
impl_shape!(A, B, C);
impl_shape!(A, B, C, D);
impl_shape!(A, B, C, D, E);
impl_shape!(A, B, C, D, E, F);

macro_rules! impl_append {
    ($($name:ident),+) => {
        impl<$($name,)+ N> Append<N> for ($($name,)+) {
            type Output = ($($name,)+ N);
        }

        impl<$($name),+> Nullable for ($($name,)+) {
            type Output = ($(Option<$name>,)+);
        }
    };
}

impl_append!(A);
impl_append!(A, B);
impl_append!(A, B, C);
impl_append!(A, B, C, D);
impl_append!(A, B, C, D, E);
