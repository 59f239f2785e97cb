use crate::Vec3;

/// Orthonormal basis built around a single direction `w`.
///
/// Used to carry directions sampled in a canonical z-up frame (for example
/// cosine-weighted hemisphere samples) onto an arbitrary surface normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Onb {
    axis: [Vec3; 3],
}

impl Onb {
    /// Build a basis whose `w` axis is `n` normalized.
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        // Any helper axis not parallel to w works.
        let a = if w.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let v = w.cross(a).normalize();
        let u = w.cross(v);
        Self { axis: [u, v, w] }
    }

    #[inline]
    pub fn u(&self) -> Vec3 {
        self.axis[0]
    }

    #[inline]
    pub fn v(&self) -> Vec3 {
        self.axis[1]
    }

    #[inline]
    pub fn w(&self) -> Vec3 {
        self.axis[2]
    }

    /// Map local coordinates `(a.x, a.y, a.z)` into world space.
    #[inline]
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u() + a.y * self.v() + a.z * self.w()
    }
}
