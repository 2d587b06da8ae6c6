use donutfield_common::{PointerOffset, ViewportState};
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use crate::RenderView;

const EPS: f32 = 1e-6;

/// Camera and orbit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub enable_damping: bool,
    pub damping_factor: f32,
    /// Fraction of the remaining distance to the pointer target covered per frame.
    pub easing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
            enable_damping: true,
            damping_factor: 0.05,
            easing: 0.04,
        }
    }
}

/// Perspective camera with a cached projection matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub rotation: Quat,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_degrees,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the projection after changing fov, aspect or clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.update_projection_matrix();
    }

    /// Orient toward `target`, keeping +Y up.
    pub fn look_at(&mut self, target: Vec3) {
        if (target - self.position).length_squared() < EPS * EPS {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, Vec3::Y);
        self.rotation = Quat::from_mat4(&view.inverse()).normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }
}

/// Orbit interaction around a target point with optional damping.
///
/// Input accumulates into pending deltas; [`OrbitControls::update`] applies
/// them. With damping, each update applies only `damping_factor` of the
/// pending delta and decays the rest, giving the camera inertia.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
        }
    }
}

impl OrbitControls {
    /// Drag of `dx, dy` logical pixels on a viewport `height` pixels tall.
    pub fn rotate(&mut self, dx: f32, dy: f32, height: f32) {
        let height = height.max(1.0);
        self.theta_delta -= TAU * dx / height * self.rotate_speed;
        self.phi_delta -= TAU * dy / height * self.rotate_speed;
    }

    /// Wheel steps; positive moves toward the target.
    pub fn zoom(&mut self, steps: f32) {
        let step = 0.95f32.powf(self.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.scale *= step;
        } else if steps < 0.0 {
            self.scale /= step;
        }
    }

    /// Screen-space drag moves the target in the camera plane.
    pub fn pan(&mut self, dx: f32, dy: f32, height: f32, camera: &PerspectiveCamera) {
        let height = height.max(1.0);
        let distance = (camera.position - self.target).length()
            * (camera.fov_degrees.to_radians() / 2.0).tan();
        let left = -camera.right() * (2.0 * dx * distance / height) * self.pan_speed;
        let up = camera.up() * (2.0 * dy * distance / height) * self.pan_speed;
        self.pan_offset += left + up;
    }

    /// Apply pending input to the camera and re-aim it at the target.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let mut radius = offset.length();
        if radius < EPS {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi.clamp(
            self.min_polar_angle.max(EPS),
            self.max_polar_angle.min(PI - EPS),
        );
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * factor;

        let sin_phi = phi.sin();
        let offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = self.target + offset;
        camera.look_at(self.target);

        if self.enable_damping {
            let decay = 1.0 - self.damping_factor;
            self.theta_delta *= decay;
            self.phi_delta *= decay;
            self.pan_offset *= decay;
        } else {
            self.theta_delta = 0.0;
            self.phi_delta = 0.0;
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;
    }
}

/// Perspective camera + orbit controls + pointer easing.
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub easing: f32,
}

impl CameraRig {
    pub fn new(config: &CameraConfig, viewport: &ViewportState) -> Self {
        let mut camera = PerspectiveCamera::new(
            config.fov_degrees,
            viewport.aspect(),
            config.near,
            config.far,
        );
        camera.position = Vec3::from_array(config.position);
        let target = Vec3::from_array(config.target);
        camera.look_at(target);

        let controls = OrbitControls {
            target,
            enable_damping: config.enable_damping,
            damping_factor: config.damping_factor,
            ..OrbitControls::default()
        };

        Self {
            camera,
            controls,
            easing: config.easing,
        }
    }

    /// Match the projection to the viewport.
    pub fn resize(&mut self, viewport: &ViewportState) {
        self.camera.set_aspect(viewport.aspect());
    }

    /// Per-frame update: orbit controls first, then ease x/y toward the pointer
    /// target (screen y negated so moving the pointer up raises the camera).
    pub fn advance(&mut self, pointer: PointerOffset) {
        self.controls.update(&mut self.camera);
        self.ease_toward(pointer);
    }

    pub fn ease_toward(&mut self, pointer: PointerOffset) {
        let target = pointer.camera_target();
        let p = &mut self.camera.position;
        p.x += (target.x - p.x) * self.easing;
        p.y += (target.y - p.y) * self.easing;
    }

    pub fn view(&self) -> RenderView {
        RenderView {
            position: self.camera.position,
            rotation: self.camera.rotation,
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            fov_degrees: self.camera.fov_degrees,
        }
    }
}
