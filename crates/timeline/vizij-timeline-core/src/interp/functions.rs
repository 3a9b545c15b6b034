//! Interpolation helpers:
//! - lerp_f32 / lerp_vec3 (component-wise)
//! - slerp_quat (shortest-arc, NLERP fallback for near-parallel inputs)
//! - bezier_y_at (cubic-bezier Y evaluated at the curve parameter)
//! - bezier_ease_solved (cubic-bezier timing with the X curve inverted)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
    ]
}

#[inline]
fn dot4(a: [f32; 4], b: [f32; 4]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3]
}

/// Normalize a quaternion (x,y,z,w); a zero quaternion becomes the identity.
#[inline]
pub fn normalize_quat(q: [f32; 4]) -> [f32; 4] {
    let len2 = dot4(q, q);
    if len2 > 0.0 && len2.is_finite() {
        let inv_len = len2.sqrt().recip();
        [q[0] * inv_len, q[1] * inv_len, q[2] * inv_len, q[3] * inv_len]
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Spherical interpolation between two rotations along the shorter arc.
pub fn slerp_quat(q1: [f32; 4], q2: [f32; 4], t: f32) -> [f32; 4] {
    let qa = normalize_quat(q1);
    let mut qb = normalize_quat(q2);

    let mut dot = dot4(qa, qb);
    // Negative dot means the long way round; flip one input.
    if dot < 0.0 {
        qb = [-qb[0], -qb[1], -qb[2], -qb[3]];
        dot = -dot;
    }

    const DOT_THRESHOLD: f32 = 0.9995;
    if dot > DOT_THRESHOLD {
        return normalize_quat([
            lerp_f32(qa[0], qb[0], t),
            lerp_f32(qa[1], qb[1], t),
            lerp_f32(qa[2], qb[2], t),
            lerp_f32(qa[3], qb[3], t),
        ]);
    }

    let theta_0 = dot.clamp(-1.0, 1.0).acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();
    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    [
        s0 * qa[0] + s1 * qb[0],
        s0 * qa[1] + s1 * qb[1],
        s0 * qa[2] + s1 * qb[2],
        s0 * qa[3] + s1 * qb[3],
    ]
}

/// Cubic Bezier basis function
#[inline]
fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Eased parameter used by keyframe sampling: the Y component of the
/// (0,0)-P1-P2-(1,1) bezier evaluated directly at parameter `t`.
///
/// The X component is ignored, so only `y1`/`y2` shape the curve.
#[inline]
pub fn bezier_y_at(t: f32, y1: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    3.0 * uu * t * y1 + 3.0 * u * tt * y2 + tt * t
}

/// Eased parameter with the X curve inverted by bisection, so the result is
/// the curve's Y at the point whose X equals `t` (CSS `cubic-bezier` timing).
pub fn bezier_ease_solved(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let mut lo = 0.0f32;
    let mut hi = 1.0f32;
    let mut mid = t;
    for _ in 0..24 {
        let x = cubic_bezier(0.0, x1, x2, 1.0, mid);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = mid;
        } else {
            hi = mid;
        }
        mid = 0.5 * (lo + hi);
    }
    cubic_bezier(0.0, y1, y2, 1.0, mid)
}
