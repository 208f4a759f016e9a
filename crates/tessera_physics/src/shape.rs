//! # Physics Shapes
//!
//! Convex primitives plus a compound grouping. Every primitive is defined
//! around its local origin; [`PhysicsShape::position`] and
//! [`PhysicsShape::rotation`] place it relative to the owning entity.

use glam::{Quat, Vec3};

use crate::error::{PhysicsResult, ShapeError};

/// Local axis a capsule, cone or cylinder is aligned with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    /// Along local X.
    X,
    /// Along local Y.
    #[default]
    Y,
    /// Along local Z.
    Z,
}

impl Axis {
    /// Unit vector of the axis.
    #[inline]
    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Geometry of a shape.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// Ball around the origin.
    Sphere {
        /// Radius.
        radius: f32,
    },
    /// Swept sphere. `length` is the distance between the two cap centres.
    Capsule {
        /// Cap radius.
        radius: f32,
        /// Distance between cap centres.
        length: f32,
        /// Axis the caps lie on.
        orientation: Axis,
    },
    /// Cone centred on the origin; the apex points along `+orientation`.
    Cone {
        /// Base radius.
        radius: f32,
        /// Base to apex.
        length: f32,
        /// Apex direction.
        orientation: Axis,
    },
    /// Cylinder centred on the origin.
    Cylinder {
        /// Radius.
        radius: f32,
        /// Half the length along `orientation`.
        half_height: f32,
        /// Axis of the cylinder.
        orientation: Axis,
    },
    /// Oriented box.
    Box {
        /// Distance from the centre to a face along each axis.
        half_extents: Vec3,
    },
    /// Convex hull of a point cloud.
    Hull {
        /// Hull points in local space.
        points: Vec<Vec3>,
    },
    /// A group of primitives, each with its own placement.
    Compound {
        /// Child shapes. Their placement is always honoured.
        children: Vec<PhysicsShape>,
    },
}

impl ShapeKind {
    /// Short name for diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sphere { .. } => "sphere",
            Self::Capsule { .. } => "capsule",
            Self::Cone { .. } => "cone",
            Self::Cylinder { .. } => "cylinder",
            Self::Box { .. } => "box",
            Self::Hull { .. } => "hull",
            Self::Compound { .. } => "compound",
        }
    }
}

/// One shape of a [`PhysicsObject`](crate::PhysicsObject).
///
/// The placement is relative to the owning entity and is only applied
/// when the object carries more than one shape. Children of a compound
/// always use theirs.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsShape {
    /// Geometry.
    pub kind: ShapeKind,
    /// Local offset.
    pub position: Vec3,
    /// Local rotation about `position`.
    pub rotation: Quat,
}

impl PhysicsShape {
    fn from_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Sphere of `radius`.
    #[must_use]
    pub fn sphere(radius: f32) -> Self {
        Self::from_kind(ShapeKind::Sphere { radius })
    }

    /// Capsule with caps `length` apart along `orientation`.
    #[must_use]
    pub fn capsule(radius: f32, length: f32, orientation: Axis) -> Self {
        Self::from_kind(ShapeKind::Capsule {
            radius,
            length,
            orientation,
        })
    }

    /// Cone pointing along `orientation`.
    #[must_use]
    pub fn cone(radius: f32, length: f32, orientation: Axis) -> Self {
        Self::from_kind(ShapeKind::Cone {
            radius,
            length,
            orientation,
        })
    }

    /// Cylinder along `orientation`.
    #[must_use]
    pub fn cylinder(radius: f32, half_height: f32, orientation: Axis) -> Self {
        Self::from_kind(ShapeKind::Cylinder {
            radius,
            half_height,
            orientation,
        })
    }

    /// Box with the given half extents.
    #[must_use]
    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::from_kind(ShapeKind::Box { half_extents })
    }

    /// Convex hull of `points`.
    #[must_use]
    pub fn hull(points: Vec<Vec3>) -> Self {
        Self::from_kind(ShapeKind::Hull { points })
    }

    /// Compound of `children`.
    #[must_use]
    pub fn compound(children: Vec<PhysicsShape>) -> Self {
        Self::from_kind(ShapeKind::Compound { children })
    }

    /// Sets the local offset.
    #[must_use]
    pub fn with_offset(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the local rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Checks extents and nesting.
    ///
    /// # Errors
    ///
    /// Returns the first [`ShapeError`] found.
    pub fn validate(&self) -> PhysicsResult<()> {
        self.validate_at_depth(0)
    }

    fn validate_at_depth(&self, depth: usize) -> PhysicsResult<()> {
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(ShapeError::InvalidPlacement);
        }

        let name = self.kind.name();
        match &self.kind {
            ShapeKind::Sphere { radius } => positive(name, "radius", *radius),
            ShapeKind::Capsule { radius, length, .. } => {
                positive(name, "radius", *radius)?;
                // Zero length degenerates to a sphere, which is fine
                non_negative(name, "length", *length)
            }
            ShapeKind::Cone { radius, length, .. } => {
                positive(name, "radius", *radius)?;
                positive(name, "length", *length)
            }
            ShapeKind::Cylinder {
                radius,
                half_height,
                ..
            } => {
                positive(name, "radius", *radius)?;
                positive(name, "half_height", *half_height)
            }
            ShapeKind::Box { half_extents } => {
                positive(name, "half_extents.x", half_extents.x)?;
                positive(name, "half_extents.y", half_extents.y)?;
                positive(name, "half_extents.z", half_extents.z)
            }
            ShapeKind::Hull { points } => {
                if points.is_empty() {
                    return Err(ShapeError::EmptyHull);
                }
                if points.iter().any(|p| !p.is_finite()) {
                    return Err(ShapeError::InvalidExtent {
                        shape: name,
                        field: "points",
                        value: f32::NAN,
                    });
                }
                Ok(())
            }
            ShapeKind::Compound { children } => {
                if depth > 0 {
                    return Err(ShapeError::NestedCompound);
                }
                if children.is_empty() {
                    return Err(ShapeError::EmptyCompound);
                }
                children
                    .iter()
                    .try_for_each(|child| child.validate_at_depth(depth + 1))
            }
        }
    }
}

fn positive(shape: &'static str, field: &'static str, value: f32) -> PhysicsResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidExtent { shape, field, value })
    }
}

fn non_negative(shape: &'static str, field: &'static str, value: f32) -> PhysicsResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ShapeError::InvalidExtent { shape, field, value })
    }
}
