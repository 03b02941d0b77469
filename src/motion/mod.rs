//! Affine motion of a mesh along a one-parameter transform group.
//!
//! Given a mesh and a single 4x4 end pose `A`, [`AffineMotion`] animates the
//! mesh from the identity to `A` by evaluating `A(t) = exp(t · log A)` for
//! `t` in `(0, 1]`. Unlike a linear blend of matrix entries, every
//! intermediate `A(t)` is a proper rigid-plus-scale transform, so a rotating
//! body does not shrink halfway through the turn.
//!
//! The engine owns three meshes with identical connectivity:
//!
//! - `source`: the mesh as loaded, never modified
//! - `current`: the source evaluated at the current step
//! - `destination`: the source evaluated at `t = 1`
//!
//! Every step recomputes `current` from the source positions, so errors do
//! not accumulate over the animation.
//!
//! # Example
//!
//! ```
//! use affine_motion::mesh::NodeId;
//! use affine_motion::motion::{AffineMotion, MotionOptions};
//!
//! let off = "OFF\n3 1 3\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
//! let matrix = "1 0 0 4\n0 1 0 0\n0 0 1 0\n0 0 0 1\n";
//!
//! let mut motion = AffineMotion::new(MotionOptions::new(4)).unwrap();
//! motion.read_mesh(off.as_bytes()).unwrap();
//! motion.read_affinity_matrix(matrix.as_bytes()).unwrap();
//!
//! let t = motion.advance().unwrap();
//! assert_eq!(t, Some(0.25));
//! let p = motion.current().unwrap().position(NodeId::new(0));
//! assert!((p.x - 1.0).abs() < 1e-9);
//! ```

mod command;
mod lie;

pub use command::{Command, CommandOutcome, DisplayOptions};
pub use lie::{LieGroup, MatrixLieGroup};

use std::io::BufRead;
use std::path::{Path, PathBuf};

use log::{debug, info};
use nalgebra::{Matrix4, Point3};
use rayon::prelude::*;

use crate::error::{MeshError, Result};
use crate::io::{self, matrix, obj, off};
use crate::mesh::Mesh;
use crate::progress::Progress;

/// Options for the motion engine.
#[derive(Debug, Clone)]
pub struct MotionOptions {
    /// Number of steps from the identity to the end pose.
    pub max_steps: usize,

    /// Whether to transform vertices in parallel (default: true).
    pub parallel: bool,
}

impl Default for MotionOptions {
    fn default() -> Self {
        Self::new(100)
    }
}

impl MotionOptions {
    /// Create options with the given number of steps.
    pub fn new(max_steps: usize) -> Self {
        Self {
            max_steps,
            parallel: true,
        }
    }

    /// Set the number of steps.
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that the options describe a usable animation.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(MeshError::invalid_param(
                "max_steps",
                self.max_steps,
                "must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parameter increment per step.
    pub fn dt(&self) -> f64 {
        1.0 / self.max_steps as f64
    }
}

/// Where the engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// The mesh, the transform, or both are missing.
    Unloaded,
    /// Mesh and transform are loaded; the current mesh is at the identity.
    Loaded,
    /// At least one step has been taken.
    Animating,
}

#[derive(Debug, Clone)]
struct MeshSet {
    source: Mesh,
    current: Mesh,
    destination: Mesh,
}

#[derive(Debug, Clone)]
struct TransformPath {
    a: Matrix4<f64>,
    log_a: Matrix4<f64>,
    start: Point3<f64>,
    end: Point3<f64>,
}

/// Interpolates a mesh between the identity and an affine end pose.
///
/// Matrices are kept in the engine's convention, the transpose of the file
/// layout: translations sit in the bottom row and a point `p` maps to
/// `(Mᵀ · [p, 1]).xyz`.
#[derive(Debug)]
pub struct AffineMotion<L: LieGroup = MatrixLieGroup> {
    lie: L,
    options: MotionOptions,
    display: DisplayOptions,
    meshes: Option<MeshSet>,
    path: Option<TransformPath>,
    /// Transform applied to `current` at the last evaluation.
    at: Matrix4<f64>,
    step: usize,
    destination_ready: bool,
}

impl AffineMotion<MatrixLieGroup> {
    /// Create an engine using the built-in matrix logarithm.
    pub fn new(options: MotionOptions) -> Result<Self> {
        Self::with_backend(options, MatrixLieGroup::new())
    }
}

impl<L: LieGroup> AffineMotion<L> {
    /// Create an engine with a custom Lie-group backend.
    pub fn with_backend(options: MotionOptions, lie: L) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            lie,
            options,
            display: DisplayOptions::default(),
            meshes: None,
            path: None,
            at: Matrix4::identity(),
            step: 0,
            destination_ready: false,
        })
    }

    // ==================== Loading ====================

    /// Read the source mesh in OFF format.
    ///
    /// On failure the engine is left without a mesh.
    pub fn read_mesh<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.meshes = None;
        let mesh = off::read(reader)?;
        self.set_mesh(mesh)
    }

    /// Load the source mesh from a file, choosing the format by extension.
    pub fn load_mesh<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.meshes = None;
        let mesh = io::load(path)?;
        self.set_mesh(mesh)
    }

    /// Use `mesh` as the source and clone it into the current and
    /// destination meshes.
    pub fn set_mesh(&mut self, mut mesh: Mesh) -> Result<()> {
        mesh.set_surface_normals();
        mesh.update_bounds();

        let current = mesh.clone();
        let destination = mesh.clone();
        self.meshes = Some(MeshSet {
            source: mesh,
            current,
            destination,
        });
        self.restart()
    }

    /// Read the end pose as 16 row-major values.
    ///
    /// On failure the engine is left without a transform.
    pub fn read_affinity_matrix<R: BufRead>(&mut self, reader: R) -> Result<()> {
        self.path = None;
        let m = matrix::read(reader)?;
        self.set_affinity_matrix(&m)
    }

    /// Load the end pose from a file.
    pub fn load_affinity_matrix<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.path = None;
        let m = matrix::load(path)?;
        self.set_affinity_matrix(&m)
    }

    /// Set the end pose from a matrix in file layout (translation in the
    /// last column).
    pub fn set_affinity_matrix(&mut self, m: &Matrix4<f64>) -> Result<()> {
        self.path = None;

        let a = m.transpose();
        let log_a = self.lie.logarithm(&a)?;
        debug!("end pose:{}", a);
        debug!("logarithm:{}", log_a);

        let start = Point3::origin();
        let end = Point3::new(a[(3, 0)], a[(3, 1)], a[(3, 2)]);
        info!("affine path from {} to {}", start, end);

        self.path = Some(TransformPath {
            a,
            log_a,
            start,
            end,
        });
        self.restart()
    }

    fn restart(&mut self) -> Result<()> {
        self.step = 0;
        self.at = Matrix4::identity();
        self.destination_ready = false;
        self.prepare_destination()
    }

    /// Evaluate the destination mesh at the end pose, once per load.
    fn prepare_destination(&mut self) -> Result<()> {
        if self.destination_ready {
            return Ok(());
        }
        let (Some(meshes), Some(path)) = (self.meshes.as_mut(), self.path.as_ref()) else {
            return Ok(());
        };

        apply_transform(
            &path.a,
            &meshes.source,
            &mut meshes.destination,
            self.options.parallel,
        )?;
        meshes.destination.set_surface_normals();
        meshes.destination.update_bounds();
        self.destination_ready = true;
        Ok(())
    }

    // ==================== Stepping ====================

    /// Current lifecycle state.
    pub fn state(&self) -> MotionState {
        if !self.is_loaded() {
            MotionState::Unloaded
        } else if self.step == 0 {
            MotionState::Loaded
        } else {
            MotionState::Animating
        }
    }

    /// True once both a mesh and a transform are loaded.
    pub fn is_loaded(&self) -> bool {
        self.meshes.is_some() && self.path.is_some()
    }

    fn require_loaded(&self) -> Result<()> {
        if self.meshes.is_none() {
            return Err(MeshError::InvalidState("no mesh loaded".to_string()));
        }
        if self.path.is_none() {
            return Err(MeshError::InvalidState("no transform loaded".to_string()));
        }
        Ok(())
    }

    /// Take one step.
    ///
    /// Returns the new parameter, or `None` once the animation has passed
    /// `t = 1`. Steps past the end leave the current mesh untouched.
    pub fn advance(&mut self) -> Result<Option<f64>> {
        self.require_loaded()?;

        self.step += 1;
        let t = self.parameter();
        if t > 1.0 {
            debug!("step {} is past the end", self.step);
            return Ok(None);
        }

        self.evaluate_at(t)?;
        debug!("step {}: t = {}", self.step, t);
        Ok(Some(t))
    }

    /// Go back to the first step (not to the identity pose).
    pub fn reset_to_first_step(&mut self) -> Result<f64> {
        self.require_loaded()?;

        self.step = 1;
        let t = self.parameter();
        self.evaluate_at(t)?;
        Ok(t)
    }

    /// Evaluate the current mesh at an arbitrary parameter without moving
    /// the step counter.
    pub fn evaluate_at(&mut self, t: f64) -> Result<()> {
        let at = self.transform_at(t)?;
        let parallel = self.options.parallel;
        let meshes = self
            .meshes
            .as_mut()
            .ok_or_else(|| MeshError::InvalidState("no mesh loaded".to_string()))?;

        apply_transform(&at, &meshes.source, &mut meshes.current, parallel)?;
        meshes.current.set_surface_normals();
        self.at = at;
        Ok(())
    }

    /// The interpolated transform `exp(t · log A)`.
    pub fn transform_at(&self, t: f64) -> Result<Matrix4<f64>> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| MeshError::InvalidState("no transform loaded".to_string()))?;
        Ok(self.lie.exponential(&(path.log_a * t)))
    }

    /// Dispatch a host command.
    pub fn handle_command(&mut self, command: Command) -> Result<CommandOutcome> {
        match command {
            Command::Advance => Ok(match self.advance()? {
                Some(t) => CommandOutcome::Stepped { step: self.step, t },
                None => CommandOutcome::Finished,
            }),
            Command::Reset => {
                let t = self.reset_to_first_step()?;
                Ok(CommandOutcome::Stepped { step: self.step, t })
            }
            Command::Redraw => {
                self.prepare_destination()?;
                Ok(CommandOutcome::Redraw)
            }
            toggle => {
                self.display.toggle(toggle);
                Ok(CommandOutcome::Display(self.display))
            }
        }
    }

    /// Step through the whole animation, writing every `every`-th frame and
    /// the final frame as `frame_NNNN.obj` under `dir`.
    ///
    /// The animation restarts from step 0 and ends at `t = 1`.
    pub fn export_frames<P: AsRef<Path>>(&mut self, dir: P, every: usize) -> Result<Vec<PathBuf>> {
        self.export_frames_with_progress(dir, every, &Progress::none())
    }

    /// Like [`export_frames`](Self::export_frames), with progress reporting.
    pub fn export_frames_with_progress<P: AsRef<Path>>(
        &mut self,
        dir: P,
        every: usize,
        progress: &Progress,
    ) -> Result<Vec<PathBuf>> {
        self.require_loaded()?;
        if every == 0 {
            return Err(MeshError::invalid_param("every", every, "must be at least 1"));
        }

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| MeshError::SaveError {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let total = self.options.max_steps;
        let mut written = Vec::new();
        self.step = 0;

        while self.advance()?.is_some() {
            if self.step % every == 0 || self.step == total {
                let path = dir.join(format!("frame_{:04}.obj", self.step));
                if let Some(meshes) = &self.meshes {
                    obj::save(&meshes.current, &path)?;
                }
                written.push(path);
            }
            progress.report(self.step, total, "Exporting frames");
        }

        info!("wrote {} frames to {}", written.len(), dir.display());
        Ok(written)
    }

    // ==================== Accessors ====================

    /// The mesh as loaded.
    pub fn source(&self) -> Option<&Mesh> {
        self.meshes.as_ref().map(|m| &m.source)
    }

    /// The mesh at the current step.
    pub fn current(&self) -> Option<&Mesh> {
        self.meshes.as_ref().map(|m| &m.current)
    }

    /// The mesh at the end pose. Evaluated once both inputs are loaded.
    pub fn destination(&self) -> Option<&Mesh> {
        self.meshes
            .as_ref()
            .filter(|_| self.destination_ready)
            .map(|m| &m.destination)
    }

    /// The end pose `A`, in engine convention.
    pub fn transform(&self) -> Option<&Matrix4<f64>> {
        self.path.as_ref().map(|p| &p.a)
    }

    /// `log A`.
    pub fn logarithm(&self) -> Option<&Matrix4<f64>> {
        self.path.as_ref().map(|p| &p.log_a)
    }

    /// The transform applied at the last evaluation.
    pub fn current_transform(&self) -> &Matrix4<f64> {
        &self.at
    }

    /// Start and end of the translation path, for display.
    pub fn path_endpoints(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        self.path.as_ref().map(|p| (p.start, p.end))
    }

    /// Steps taken since the last load, including steps past the end.
    pub fn step(&self) -> usize {
        self.step
    }

    /// `step × dt`. Exceeds 1 once the animation is over.
    pub fn parameter(&self) -> f64 {
        // A ratio, so the last step lands on exactly 1.
        self.step as f64 / self.options.max_steps as f64
    }

    /// Parameter increment per step.
    pub fn dt(&self) -> f64 {
        self.options.dt()
    }

    /// Engine options.
    pub fn options(&self) -> &MotionOptions {
        &self.options
    }

    /// Display flags toggled by host commands.
    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    /// The Lie-group backend.
    pub fn backend(&self) -> &L {
        &self.lie
    }
}

/// Write `(Mᵀ · [p, 1]).xyz` into `target` for every node position `p` of
/// `source`.
///
/// Positions always come from `source`, so repeated calls do not compound.
/// The meshes must have the same number of nodes; connectivity and active
/// flags of `target` are left alone.
pub fn apply_transform(
    m: &Matrix4<f64>,
    source: &Mesh,
    target: &mut Mesh,
    parallel: bool,
) -> Result<()> {
    if source.num_nodes() != target.num_nodes() {
        return Err(MeshError::InvalidState(format!(
            "cannot map {} source nodes onto {} target nodes",
            source.num_nodes(),
            target.num_nodes()
        )));
    }

    let mt = m.transpose();
    let map = |p: &Point3<f64>| {
        let h = mt * p.to_homogeneous();
        Point3::new(h.x, h.y, h.z)
    };

    if parallel {
        target
            .nodes
            .par_iter_mut()
            .zip(source.nodes.par_iter())
            .for_each(|(dst, src)| dst.position = map(&src.position));
    } else {
        for (dst, src) in target.nodes.iter_mut().zip(&source.nodes) {
            dst.position = map(&src.position);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::off::tests::cube_off;
    use crate::mesh::tests::{grid, unit_cube};
    use crate::mesh::NodeId;
    use nalgebra::Vector3;

    const SHIFT_X: &str = "1 0 0 2\n0 1 0 0\n0 0 1 0\n0 0 0 1\n";

    /// Quarter turn about z, then translate by (1, 2, 3).
    const TURN_AND_SHIFT: &str = "0 -1 0 1\n1 0 0 2\n0 0 1 3\n0 0 0 1\n";

    fn cube_motion(matrix_text: &str, max_steps: usize) -> AffineMotion {
        let mut motion = AffineMotion::new(MotionOptions::new(max_steps)).unwrap();
        motion.read_mesh(cube_off().as_bytes()).unwrap();
        motion.read_affinity_matrix(matrix_text.as_bytes()).unwrap();
        motion
    }

    fn max_distance(a: &Mesh, b: &Mesh) -> f64 {
        a.node_ids()
            .map(|n| (a.position(n) - b.position(n)).norm())
            .fold(0.0, f64::max)
    }

    fn max_offset(mesh: &Mesh, source: &Mesh, offset: Vector3<f64>) -> f64 {
        mesh.node_ids()
            .map(|n| (mesh.position(n) - (source.position(n) + offset)).norm())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_options() {
        let options = MotionOptions::default().with_max_steps(10).sequential();
        assert_eq!(options.max_steps, 10);
        assert!(!options.parallel);
        assert!((options.dt() - 0.1).abs() < 1e-15);

        let err = AffineMotion::new(MotionOptions::new(0)).unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { name: "max_steps", .. }));
    }

    #[test]
    fn test_lifecycle() {
        let mut motion = AffineMotion::new(MotionOptions::new(4)).unwrap();
        assert_eq!(motion.state(), MotionState::Unloaded);
        assert!(matches!(motion.advance(), Err(MeshError::InvalidState(_))));

        motion.read_mesh(cube_off().as_bytes()).unwrap();
        assert_eq!(motion.state(), MotionState::Unloaded);
        assert!(motion.destination().is_none());

        motion.read_affinity_matrix(SHIFT_X.as_bytes()).unwrap();
        assert_eq!(motion.state(), MotionState::Loaded);
        assert!(motion.destination().is_some());

        motion.advance().unwrap();
        assert_eq!(motion.state(), MotionState::Animating);

        // Reloading the mesh starts over.
        motion.read_mesh(cube_off().as_bytes()).unwrap();
        assert_eq!(motion.state(), MotionState::Loaded);
        assert_eq!(motion.step(), 0);
    }

    #[test]
    fn test_meshes_share_connectivity() {
        let motion = cube_motion(SHIFT_X, 4);
        let source = motion.source().unwrap();
        let current = motion.current().unwrap();
        let destination = motion.destination().unwrap();

        assert_eq!(current.num_nodes(), source.num_nodes());
        assert_eq!(destination.num_faces(), source.num_faces());
        for f in source.active_face_ids() {
            assert_eq!(current.face(f).nodes, source.face(f).nodes);
            assert_eq!(destination.face(f).nodes, source.face(f).nodes);
        }
        // Before any step the current mesh sits at the identity.
        assert_eq!(max_distance(current, source), 0.0);
    }

    #[test]
    fn test_destination_is_end_pose() {
        let motion = cube_motion(TURN_AND_SHIFT, 4);
        let destination = motion.destination().unwrap();

        // (1, 0, 0) turns to (0, 1, 0), then shifts.
        let p = destination.position(NodeId::new(1));
        assert!((p - Point3::new(1.0, 3.0, 3.0)).norm() < 1e-12);

        let (start, end) = motion.path_endpoints().unwrap();
        assert_eq!(start, Point3::origin());
        assert_eq!(end, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_translation_steps_evenly() {
        let mut motion = cube_motion(SHIFT_X, 4);
        assert_eq!(motion.advance().unwrap(), Some(0.25));
        assert_eq!(motion.advance().unwrap(), Some(0.5));

        let source = motion.source().unwrap();
        let current = motion.current().unwrap();
        assert!(max_offset(current, source, Vector3::new(1.0, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_last_step_reaches_destination() {
        let mut motion = cube_motion(TURN_AND_SHIFT, 5);
        for _ in 0..5 {
            assert!(motion.advance().unwrap().is_some());
        }
        assert_eq!(motion.parameter(), 1.0);

        let current = motion.current().unwrap().clone();
        let destination = motion.destination().unwrap();
        assert!(max_distance(&current, destination) < 1e-9);

        // Further steps are ignored.
        assert_eq!(motion.advance().unwrap(), None);
        assert_eq!(motion.step(), 6);
        assert_eq!(max_distance(motion.current().unwrap(), &current), 0.0);
    }

    #[test]
    fn test_halfway_rotation_is_rigid() {
        let mut motion = cube_motion(TURN_AND_SHIFT, 2);
        motion.advance().unwrap();

        let source = motion.source().unwrap();
        let current = motion.current().unwrap();
        let a = NodeId::new(0);
        let b = NodeId::new(6);
        let before = (source.position(a) - source.position(b)).norm();
        let after = (current.position(a) - current.position(b)).norm();
        assert!((before - after).abs() < 1e-9);

        // The generator integrates to a 45 degree turn at t = 1/2.
        let at = motion.current_transform();
        let angle = at[(0, 1)].atan2(at[(0, 0)]);
        assert!((angle - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_reset_to_first_step() {
        let mut motion = cube_motion(SHIFT_X, 4);
        for _ in 0..3 {
            motion.advance().unwrap();
        }

        assert_eq!(motion.reset_to_first_step().unwrap(), 0.25);
        assert_eq!(motion.step(), 1);
        let source = motion.source().unwrap();
        let current = motion.current().unwrap();
        assert!(max_offset(current, source, Vector3::new(0.5, 0.0, 0.0)) < 1e-9);
    }

    #[test]
    fn test_failed_loads_leave_inputs_unset() {
        let mut motion = cube_motion(SHIFT_X, 4);

        assert!(motion.read_affinity_matrix("1 0 0".as_bytes()).is_err());
        assert!(motion.transform().is_none());
        assert_eq!(motion.state(), MotionState::Unloaded);

        let reflection = "-1 0 0 0\n0 1 0 0\n0 0 1 0\n0 0 0 1\n";
        let err = motion.read_affinity_matrix(reflection.as_bytes()).unwrap_err();
        assert!(matches!(err, MeshError::NoRealLogarithm { .. }));
        assert!(motion.logarithm().is_none());

        let err = motion.read_mesh("OFX\n".as_bytes()).unwrap_err();
        assert!(err.is_input_format());
        assert!(motion.source().is_none());
    }

    #[test]
    fn test_apply_identity_is_exact() {
        let source = unit_cube();
        let mut target = source.clone();
        target.set_position(NodeId::new(0), Point3::new(9.0, 9.0, 9.0));

        apply_transform(&Matrix4::identity(), &source, &mut target, false).unwrap();
        for n in source.node_ids() {
            assert_eq!(target.position(n), source.position(n));
        }
    }

    #[test]
    fn test_apply_parallel_matches_sequential() {
        let source = grid(6);
        let m = crate::io::matrix::read(TURN_AND_SHIFT.as_bytes()).unwrap().transpose();

        let mut seq = source.clone();
        let mut par = source.clone();
        apply_transform(&m, &source, &mut seq, false).unwrap();
        apply_transform(&m, &source, &mut par, true).unwrap();
        assert_eq!(max_distance(&seq, &par), 0.0);
    }

    #[test]
    fn test_apply_node_count_mismatch() {
        let source = unit_cube();
        let mut target = grid(1);
        let err = apply_transform(&Matrix4::identity(), &source, &mut target, true).unwrap_err();
        assert!(matches!(err, MeshError::InvalidState(_)));
    }

    #[test]
    fn test_normals_follow_motion() {
        let mut motion = cube_motion(TURN_AND_SHIFT, 1);
        motion.advance().unwrap();

        // Bottom face normal stays -z under a turn about z.
        let current = motion.current().unwrap();
        let normal = current.face(crate::mesh::FaceId::new(0)).normal;
        assert!((normal - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-9);
    }

    #[test]
    fn test_handle_command() {
        let mut motion = cube_motion(SHIFT_X, 2);

        assert_eq!(
            motion.handle_command(Command::Advance).unwrap(),
            CommandOutcome::Stepped { step: 1, t: 0.5 }
        );
        motion.handle_command(Command::Advance).unwrap();
        assert_eq!(
            motion.handle_command(Command::Advance).unwrap(),
            CommandOutcome::Finished
        );
        assert_eq!(
            motion.handle_command(Command::Reset).unwrap(),
            CommandOutcome::Stepped { step: 1, t: 0.5 }
        );

        match motion.handle_command(Command::ToggleLights).unwrap() {
            CommandOutcome::Display(display) => assert!(display.lights),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert!(motion.display().lights);
        assert_eq!(
            motion.handle_command(Command::Redraw).unwrap(),
            CommandOutcome::Redraw
        );
    }

    #[test]
    fn test_saved_frame_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("end.obj");

        let mut motion = cube_motion(TURN_AND_SHIFT, 3);
        while motion.advance().unwrap().is_some() {}
        obj::save(motion.current().unwrap(), &path).unwrap();

        let loaded = io::load(&path).unwrap();
        let current = motion.current().unwrap();
        assert_eq!(loaded.num_active_faces(), current.num_active_faces());
        assert!(max_distance(&loaded, current) < 1e-12);
    }

    #[test]
    fn test_export_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut motion = cube_motion(SHIFT_X, 5);

        let frames = motion.export_frames(dir.path().join("frames"), 2).unwrap();
        let names: Vec<String> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["frame_0002.obj", "frame_0004.obj", "frame_0005.obj"]);
        assert!(frames.iter().all(|p| p.exists()));

        assert!(matches!(
            motion.export_frames(dir.path(), 0),
            Err(MeshError::InvalidParameter { .. })
        ));
    }
}
