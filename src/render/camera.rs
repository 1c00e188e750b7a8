use glam::{Mat4, Vec2, Vec3};

/// Orbit camera around the model. Zoom scales the framing distance, the
/// settings panel drives it directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_deg: f32,
    base_distance: f32,
    zoom: f32,
}

/// World-space ray, `direction` normalized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl OrbitCamera {
    pub fn new(target: Vec3, distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            target,
            yaw,
            pitch: clamp_pitch(pitch),
            fov_y_deg: 75.0,
            base_distance: distance.max(0.05),
            zoom: 1.0,
        }
    }

    /// Frames bounds given as center and half-extent.
    pub fn from_bounds(center: Vec3, extent: Vec3) -> Self {
        let radius = extent.max_element();
        let distance = if radius > 0.0 { radius * 3.0 } else { 3.0 };
        Self::new(center, distance, 0.0, 0.0)
    }

    pub fn distance(&self) -> f32 {
        self.base_distance / self.zoom
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn orbit(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw = wrap_angle(self.yaw + yaw_delta);
        self.pitch = clamp_pitch(self.pitch + pitch_delta);
    }

    pub fn eye(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        let offset = Vec3::new(
            self.yaw.sin() * cos_pitch,
            self.pitch.sin(),
            self.yaw.cos() * cos_pitch,
        );
        self.target + offset * self.distance()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        let near = (self.distance() * 0.01).max(0.001);
        let far = self.distance() * 100.0 + 1.0;
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect.max(1e-3), near, far)
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }

    /// Ray through a pointer position given in pixels, top-left origin.
    pub fn screen_ray(&self, pointer: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            (pointer.x / viewport.x) * 2.0 - 1.0,
            -(pointer.y / viewport.y) * 2.0 + 1.0,
        );
        let inverse = self.view_proj(viewport.x / viewport.y).inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        let direction = (far - near).normalize_or_zero();
        if direction == Vec3::ZERO || !near.is_finite() {
            return None;
        }
        Some(Ray {
            origin: near,
            direction,
        })
    }
}

fn clamp_pitch(pitch: f32) -> f32 {
    const LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
    if pitch.is_finite() {
        pitch.clamp(-LIMIT, LIMIT)
    } else {
        0.0
    }
}

fn wrap_angle(angle: f32) -> f32 {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if angle.is_finite() {
        (angle + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bounds_produces_finite_state() {
        let camera = OrbitCamera::from_bounds(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert!(camera.eye().is_finite());
        assert!((camera.distance() - 18.0).abs() < 1e-5);
    }

    #[test]
    fn zoom_moves_camera_closer() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 4.0, 0.0, 0.0);
        camera.set_zoom(2.0);
        assert!((camera.eye() - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-5);
        camera.set_zoom(0.0);
        assert_eq!(camera.zoom(), 2.0);
    }

    #[test]
    fn center_ray_points_at_target() {
        let camera = OrbitCamera::new(Vec3::ZERO, 5.0, 0.3, 0.2);
        let ray = camera
            .screen_ray(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0))
            .unwrap();
        let to_target = (camera.target - camera.eye()).normalize();
        assert!(ray.direction.dot(to_target) > 0.9999);
    }

    #[test]
    fn orbit_keeps_pitch_below_pole() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 1.0, 0.0, 0.0);
        camera.orbit(10.0, 10.0);
        assert!(camera.pitch < std::f32::consts::FRAC_PI_2);
        assert!(camera.yaw.abs() <= std::f32::consts::PI);
        assert!(camera.view().is_finite());
    }

    #[test]
    fn empty_viewport_has_no_ray() {
        let camera = OrbitCamera::new(Vec3::ZERO, 1.0, 0.0, 0.0);
        assert!(camera.screen_ray(Vec2::ZERO, Vec2::ZERO).is_none());
    }
}
