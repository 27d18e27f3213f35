use super::error::EngineError;
use crate::core::io::poscar::Poscar;
use std::path::Path;

pub const STRUCTURE_FILE: &str = "POSCAR";
pub const RUN_PARAMETERS_FILE: &str = "INCAR";
pub const KPOINTS_FILE: &str = "KPOINTS";
pub const POTENTIALS_FILE: &str = "POTCAR";
pub const PRESSURE_LOG_FILE: &str = "OUTCAR";
pub const STEP_LOG_FILE: &str = "OSZICAR";

/// Molecular-dynamics run parameters written into the staged INCAR.
#[derive(Debug, Clone, PartialEq)]
pub struct MdParameters {
    pub steps: usize,
    pub timestep_fs: f64,
}

impl Default for MdParameters {
    fn default() -> Self {
        Self {
            steps: 100,
            timestep_fs: 1.0,
        }
    }
}

pub fn render_run_parameters(temperature: f64, md: &MdParameters) -> String {
    format!(
        "SYSTEM = isobar trial\n\
         IBRION = 0\n\
         NSW    = {steps}\n\
         POTIM  = {timestep:.2}\n\
         TEBEG  = {temperature:.1}\n\
         TEEND  = {temperature:.1}\n\
         SMASS  = 0\n\
         ISIF   = 2\n\
         LWAVE  = .FALSE.\n\
         LCHARG = .FALSE.\n",
        steps = md.steps,
        timestep = md.timestep_fs,
        temperature = temperature,
    )
}

pub fn render_kpoints() -> String {
    "Gamma-point only\n0\nGamma\n1 1 1\n0 0 0\n".to_string()
}

/// Stages every simulator input for one trial, deterministically overwriting
/// whatever a previous trial left behind.
///
/// The pristine reference structure is re-read on every call, so the staged
/// `POSCAR` never inherits state from an earlier trial. Stale output artifacts
/// are removed so a failed run cannot be mistaken for a finished one.
pub fn stage_inputs(
    work_dir: &Path,
    reference_structure: &Path,
    volume: f64,
    temperature: f64,
    md: &MdParameters,
) -> Result<(), EngineError> {
    if !reference_structure.exists() {
        return Err(EngineError::Precondition {
            what: "reference structure",
            path: reference_structure.to_path_buf(),
        });
    }
    let potentials = work_dir.join(POTENTIALS_FILE);
    if !potentials.exists() {
        return Err(EngineError::Precondition {
            what: "pseudopotential file",
            path: potentials,
        });
    }

    let reference =
        Poscar::read_from_path(reference_structure).map_err(|source| EngineError::Structure {
            path: reference_structure.to_path_buf(),
            source,
        })?;

    let structure_path = work_dir.join(STRUCTURE_FILE);
    reference
        .restaged_at_volume(volume)
        .write_to_path(&structure_path)
        .map_err(|source| EngineError::Staging {
            path: structure_path.clone(),
            source,
        })?;

    let incar_path = work_dir.join(RUN_PARAMETERS_FILE);
    std::fs::write(&incar_path, render_run_parameters(temperature, md)).map_err(|source| {
        EngineError::Staging {
            path: incar_path.clone(),
            source,
        }
    })?;

    let kpoints_path = work_dir.join(KPOINTS_FILE);
    std::fs::write(&kpoints_path, render_kpoints()).map_err(|source| EngineError::Staging {
        path: kpoints_path.clone(),
        source,
    })?;

    for stale in [PRESSURE_LOG_FILE, STEP_LOG_FILE] {
        let path = work_dir.join(stale);
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(EngineError::Staging { path, source }),
        }
    }

    Ok(())
}
