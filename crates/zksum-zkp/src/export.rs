//! # Export Adapter
//!
//! Serializes a Groth16 proof, its verifying key and the ordered public
//! inputs into the JSON convention used by `snarkjs`, and reads that
//! convention back. A binary triple in arkworks' canonical compressed
//! encoding and key persistence live here too.
//!
//! ## JSON Convention
//!
//! - Every field element is a canonical decimal string.
//! - G1: `[x, y, "1"]`, infinity `["0", "1", "0"]`.
//! - G2: `[[x.c0, x.c1], [y.c0, y.c1], ["1", "0"]]`.
//! - Object keys are byte-wise alphabetical; struct field order below is
//!   that order.
//! - `public.json` is the public-input vector in circuit order,
//!   `ExpectedSum` first.
//!
//! ## Security Invariant
//!
//! Import rejects non-canonical decimals, points off the curve or outside
//! the prime-order subgroup, and a `vk_alphabeta_12` that disagrees with
//! `e(vk_alpha_1, vk_beta_2)`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use ark_bn254::{Bn254, Fq, Fq2, Fq6, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use zksum_core::{from_decimal, to_decimal, F};

use crate::error::ExportError;
use crate::groth16::{Groth16Backend, Proof, ProvingKey, VerifyingKey};
use crate::workflow::KeyPair;

/// `protocol` tag.
pub const PROTOCOL: &str = "groth16";

/// `curve` tag for BN254.
pub const CURVE: &str = "bn128";

/// A G1 point as decimal strings.
pub type G1Json = [String; 3];

/// A G2 point as decimal strings.
pub type G2Json = [[String; 2]; 3];

/// An Fq12 element as nested decimal strings.
pub type Fq12Json = [[[String; 2]; 3]; 2];

/// `proof.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofJson {
    pub curve: String,
    pub pi_a: G1Json,
    pub pi_b: G2Json,
    pub pi_c: G1Json,
    pub protocol: String,
}

/// `verification_key.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationKeyJson {
    #[serde(rename = "IC")]
    pub ic: Vec<G1Json>,
    pub curve: String,
    #[serde(rename = "nPublic")]
    pub n_public: usize,
    pub protocol: String,
    pub vk_alpha_1: G1Json,
    pub vk_alphabeta_12: Fq12Json,
    pub vk_beta_2: G2Json,
    pub vk_delta_2: G2Json,
    pub vk_gamma_2: G2Json,
}

/// Locations of the three JSON artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub proof: PathBuf,
    pub verification_key: PathBuf,
    pub public: PathBuf,
}

impl ExportPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            proof: dir.join("proof.json"),
            verification_key: dir.join("verification_key.json"),
            public: dir.join("public.json"),
        }
    }
}

/// Locations of the binary artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryPaths {
    pub proof: PathBuf,
    pub verifying_key: PathBuf,
    pub public_witness: PathBuf,
}

impl BinaryPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            proof: dir.join("proof.bin"),
            verifying_key: dir.join("vk.bin"),
            public_witness: dir.join("public_witness.bin"),
        }
    }
}

/// Locations of persisted keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPaths {
    pub proving_key: PathBuf,
    pub verifying_key: PathBuf,
}

impl KeyPaths {
    /// The conventional file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            proving_key: dir.join("proving_key.bin"),
            verifying_key: dir.join("verifying_key.bin"),
        }
    }

    /// Whether both key files exist.
    pub fn exist(&self) -> bool {
        self.proving_key.is_file() && self.verifying_key.is_file()
    }
}

/// Artifacts read back from disk.
#[derive(Debug, Clone)]
pub struct ImportedArtifacts {
    pub proof: Proof,
    pub verifying_key: VerifyingKey,
    pub public_inputs: Vec<F>,
}

// ─── Point encoding ──────────────────────────────────────────────────

fn fq2_json(x: &Fq2) -> [String; 2] {
    [to_decimal(&x.c0), to_decimal(&x.c1)]
}

fn g1_json(p: &G1Affine) -> G1Json {
    if p.infinity {
        return ["0".into(), "1".into(), "0".into()];
    }
    [to_decimal(&p.x), to_decimal(&p.y), "1".into()]
}

fn g2_json(p: &G2Affine) -> G2Json {
    if p.infinity {
        return [
            ["0".into(), "0".into()],
            ["1".into(), "0".into()],
            ["0".into(), "0".into()],
        ];
    }
    [fq2_json(&p.x), fq2_json(&p.y), ["1".into(), "0".into()]]
}

fn alphabeta_json(alpha: &G1Affine, beta: &G2Affine) -> Fq12Json {
    let gt = Bn254::pairing(*alpha, *beta).0;
    let fq6 = |x: &Fq6| [fq2_json(&x.c0), fq2_json(&x.c1), fq2_json(&x.c2)];
    [fq6(&gt.c0), fq6(&gt.c1)]
}

fn parse_fq(what: &'static str, s: &str) -> Result<Fq, ExportError> {
    from_decimal(s).ok_or_else(|| ExportError::InvalidField {
        what,
        value: s.to_string(),
    })
}

fn parse_fq2(what: &'static str, v: &[String; 2]) -> Result<Fq2, ExportError> {
    Ok(Fq2::new(parse_fq(what, &v[0])?, parse_fq(what, &v[1])?))
}

fn parse_g1(what: &'static str, v: &G1Json) -> Result<G1Affine, ExportError> {
    match v[2].as_str() {
        "0" if v[0] == "0" && v[1] == "1" => return Ok(G1Affine::identity()),
        "1" => {}
        _ => return Err(ExportError::InvalidPoint(what)),
    }
    let p = G1Affine::new_unchecked(parse_fq(what, &v[0])?, parse_fq(what, &v[1])?);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ExportError::InvalidPoint(what));
    }
    Ok(p)
}

fn parse_g2(what: &'static str, v: &G2Json) -> Result<G2Affine, ExportError> {
    let z = (v[2][0].as_str(), v[2][1].as_str());
    if z == ("0", "0") {
        return Ok(G2Affine::identity());
    }
    if z != ("1", "0") {
        return Err(ExportError::InvalidPoint(what));
    }
    let p = G2Affine::new_unchecked(parse_fq2(what, &v[0])?, parse_fq2(what, &v[1])?);
    if !p.is_on_curve() || !p.is_in_correct_subgroup_assuming_on_curve() {
        return Err(ExportError::InvalidPoint(what));
    }
    Ok(p)
}

fn check_tags(protocol: &str, curve: &str) -> Result<(), ExportError> {
    if protocol != PROTOCOL {
        return Err(ExportError::Unsupported {
            field: "protocol",
            value: protocol.to_string(),
        });
    }
    if curve != CURVE {
        return Err(ExportError::Unsupported {
            field: "curve",
            value: curve.to_string(),
        });
    }
    Ok(())
}

// ─── Conversions ─────────────────────────────────────────────────────

impl From<&Proof> for ProofJson {
    fn from(proof: &Proof) -> Self {
        Self {
            curve: CURVE.to_string(),
            pi_a: g1_json(&proof.a),
            pi_b: g2_json(&proof.b),
            pi_c: g1_json(&proof.c),
            protocol: PROTOCOL.to_string(),
        }
    }
}

impl ProofJson {
    /// Parse back into a proof.
    pub fn to_proof(&self) -> Result<Proof, ExportError> {
        check_tags(&self.protocol, &self.curve)?;
        Ok(Proof {
            a: parse_g1("pi_a", &self.pi_a)?,
            b: parse_g2("pi_b", &self.pi_b)?,
            c: parse_g1("pi_c", &self.pi_c)?,
        })
    }
}

impl From<&VerifyingKey> for VerificationKeyJson {
    fn from(vk: &VerifyingKey) -> Self {
        Self {
            ic: vk.gamma_abc_g1.iter().map(g1_json).collect(),
            curve: CURVE.to_string(),
            n_public: vk.gamma_abc_g1.len().saturating_sub(1),
            protocol: PROTOCOL.to_string(),
            vk_alpha_1: g1_json(&vk.alpha_g1),
            vk_alphabeta_12: alphabeta_json(&vk.alpha_g1, &vk.beta_g2),
            vk_beta_2: g2_json(&vk.beta_g2),
            vk_delta_2: g2_json(&vk.delta_g2),
            vk_gamma_2: g2_json(&vk.gamma_g2),
        }
    }
}

impl VerificationKeyJson {
    /// Parse back into a verifying key.
    pub fn to_verifying_key(&self) -> Result<VerifyingKey, ExportError> {
        check_tags(&self.protocol, &self.curve)?;
        if self.ic.len() != self.n_public + 1 {
            return Err(ExportError::Inconsistent(format!(
                "nPublic is {} but IC holds {} points",
                self.n_public,
                self.ic.len()
            )));
        }
        let vk = VerifyingKey {
            alpha_g1: parse_g1("vk_alpha_1", &self.vk_alpha_1)?,
            beta_g2: parse_g2("vk_beta_2", &self.vk_beta_2)?,
            gamma_g2: parse_g2("vk_gamma_2", &self.vk_gamma_2)?,
            delta_g2: parse_g2("vk_delta_2", &self.vk_delta_2)?,
            gamma_abc_g1: self
                .ic
                .iter()
                .map(|p| parse_g1("IC", p))
                .collect::<Result<_, _>>()?,
        };
        if alphabeta_json(&vk.alpha_g1, &vk.beta_g2) != self.vk_alphabeta_12 {
            return Err(ExportError::Inconsistent(
                "vk_alphabeta_12 does not match e(vk_alpha_1, vk_beta_2)".to_string(),
            ));
        }
        Ok(vk)
    }
}

/// Public inputs as decimal strings.
pub fn public_json(public: &[F]) -> Vec<String> {
    public.iter().map(to_decimal).collect()
}

/// Parse decimal public inputs.
pub fn parse_public(values: &[String]) -> Result<Vec<F>, ExportError> {
    values
        .iter()
        .map(|s| {
            from_decimal(s).ok_or_else(|| ExportError::InvalidField {
                what: "public input",
                value: s.clone(),
            })
        })
        .collect()
}

// ─── Files ───────────────────────────────────────────────────────────

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ExportError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn write_binary<T: CanonicalSerialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    value
        .serialize_compressed(&mut writer)
        .map_err(|e| ExportError::Serialization(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

fn read_binary<T: CanonicalDeserialize>(path: &Path) -> Result<T, ExportError> {
    let mut reader = BufReader::new(File::open(path)?);
    T::deserialize_compressed(&mut reader).map_err(|e| ExportError::Serialization(e.to_string()))
}

fn check_public_len(vk: &VerifyingKey, public: &[F]) -> Result<(), ExportError> {
    let expected = vk.gamma_abc_g1.len().saturating_sub(1);
    if public.len() != expected {
        return Err(ExportError::Inconsistent(format!(
            "verifying key expects {expected} public inputs, got {}",
            public.len()
        )));
    }
    Ok(())
}

/// Write `proof.json`, `verification_key.json` and `public.json` into `dir`.
pub fn export_json(dir: &Path, proof: &Proof, vk: &VerifyingKey, public: &[F]) -> Result<ExportPaths, ExportError> {
    check_public_len(vk, public)?;
    std::fs::create_dir_all(dir)?;
    let paths = ExportPaths::in_dir(dir);
    write_json(&paths.proof, &ProofJson::from(proof))?;
    write_json(&paths.verification_key, &VerificationKeyJson::from(vk))?;
    write_json(&paths.public, &public_json(public))?;
    tracing::info!(dir = %dir.display(), n_public = public.len(), "exported json proof artifacts");
    Ok(paths)
}

/// Read and validate the three JSON artifacts.
pub fn import_json(paths: &ExportPaths) -> Result<ImportedArtifacts, ExportError> {
    let proof = read_json::<ProofJson>(&paths.proof)?.to_proof()?;
    let verifying_key = read_json::<VerificationKeyJson>(&paths.verification_key)?.to_verifying_key()?;
    let public_inputs = parse_public(&read_json::<Vec<String>>(&paths.public)?)?;
    check_public_len(&verifying_key, &public_inputs)?;
    Ok(ImportedArtifacts {
        proof,
        verifying_key,
        public_inputs,
    })
}

/// Write `proof.bin`, `vk.bin` and `public_witness.bin` into `dir`.
pub fn export_binary(dir: &Path, proof: &Proof, vk: &VerifyingKey, public: &[F]) -> Result<BinaryPaths, ExportError> {
    check_public_len(vk, public)?;
    std::fs::create_dir_all(dir)?;
    let paths = BinaryPaths::in_dir(dir);
    write_binary(&paths.proof, proof)?;
    write_binary(&paths.verifying_key, vk)?;
    write_binary(&paths.public_witness, &public.to_vec())?;
    tracing::info!(dir = %dir.display(), n_public = public.len(), "exported binary proof artifacts");
    Ok(paths)
}

/// Read the binary triple.
pub fn import_binary(paths: &BinaryPaths) -> Result<ImportedArtifacts, ExportError> {
    let proof = read_binary(&paths.proof)?;
    let verifying_key: VerifyingKey = read_binary(&paths.verifying_key)?;
    let public_inputs: Vec<F> = read_binary(&paths.public_witness)?;
    check_public_len(&verifying_key, &public_inputs)?;
    Ok(ImportedArtifacts {
        proof,
        verifying_key,
        public_inputs,
    })
}

/// Persist a key pair so later processes can skip setup.
pub fn save_keys(dir: &Path, keys: &KeyPair<Groth16Backend>) -> Result<KeyPaths, ExportError> {
    std::fs::create_dir_all(dir)?;
    let paths = KeyPaths::in_dir(dir);
    write_binary(&paths.proving_key, &keys.proving_key)?;
    write_binary(&paths.verifying_key, &keys.verifying_key)?;
    tracing::info!(dir = %dir.display(), "saved groth16 keys");
    Ok(paths)
}

/// Load a key pair written by [`save_keys`].
pub fn load_keys(paths: &KeyPaths) -> Result<KeyPair<Groth16Backend>, ExportError> {
    let proving_key: ProvingKey = read_binary(&paths.proving_key)?;
    let verifying_key: VerifyingKey = read_binary(&paths.verifying_key)?;
    if proving_key.vk != verifying_key {
        return Err(ExportError::Inconsistent(
            "verifying key does not belong to the proving key".to_string(),
        ));
    }
    Ok(KeyPair {
        proving_key,
        verifying_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProofSystem;
    use crate::workflow::{ProofWorkflow, Proved};
    use ark_ec::AffineRepr;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use zksum_core::{FixedPointEncoder, PipelineConfig, PrecisionPolicy};

    fn proved() -> ProofWorkflow<Proved<Groth16Backend>> {
        let config = PipelineConfig {
            batch_size: 2,
            ..PipelineConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let ready = ProofWorkflow::from_config(&config)
            .unwrap()
            .compile()
            .unwrap()
            .setup(&mut rng)
            .unwrap();
        let batch = FixedPointEncoder::new(1000, PrecisionPolicy::Round)
            .unwrap()
            .encode_batch(&[1.3, 2.3], 2)
            .unwrap();
        ready.bind_batch(&batch).unwrap().prove(&mut rng).unwrap()
    }

    #[test]
    fn identity_points_use_projective_convention() {
        assert_eq!(g1_json(&G1Affine::identity()), ["0", "1", "0"]);
        assert_eq!(parse_g1("test", &g1_json(&G1Affine::identity())).unwrap(), G1Affine::identity());
        assert_eq!(parse_g2("test", &g2_json(&G2Affine::identity())).unwrap(), G2Affine::identity());
    }

    #[test]
    fn generator_roundtrips_through_decimal() {
        let g = G1Affine::generator();
        let json = g1_json(&g);
        assert_eq!(json[0], "1");
        assert_eq!(json[1], "2");
        assert_eq!(parse_g1("g", &json).unwrap(), g);
        let h = G2Affine::generator();
        assert_eq!(parse_g2("h", &g2_json(&h)).unwrap(), h);
    }

    #[test]
    fn off_curve_point_rejected() {
        let bad: G1Json = ["1".into(), "3".into(), "1".into()];
        assert!(matches!(parse_g1("pi_a", &bad), Err(ExportError::InvalidPoint("pi_a"))));
    }

    #[test]
    fn non_canonical_decimal_rejected() {
        let bad: G1Json = ["01".into(), "2".into(), "1".into()];
        assert!(matches!(parse_g1("pi_a", &bad), Err(ExportError::InvalidField { .. })));
    }

    #[test]
    fn json_files_have_alphabetical_keys_and_verify_after_import() {
        let workflow = proved();
        let dir = tempfile::tempdir().unwrap();
        let paths = workflow.export(dir.path()).unwrap();

        let vk_text = std::fs::read_to_string(&paths.verification_key).unwrap();
        let keys = [
            "\"IC\"",
            "\"curve\"",
            "\"nPublic\"",
            "\"protocol\"",
            "\"vk_alpha_1\"",
            "\"vk_alphabeta_12\"",
            "\"vk_beta_2\"",
            "\"vk_delta_2\"",
            "\"vk_gamma_2\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| vk_text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(vk_text.contains("\"nPublic\": 2"));

        let proof_text = std::fs::read_to_string(&paths.proof).unwrap();
        let keys = ["\"curve\"", "\"pi_a\"", "\"pi_b\"", "\"pi_c\"", "\"protocol\""];
        let positions: Vec<usize> = keys.iter().map(|k| proof_text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(proof_text.contains("\"bn128\"") && proof_text.contains("\"groth16\""));

        let public_text = std::fs::read_to_string(&paths.public).unwrap();
        assert!(public_text.starts_with("[\n  \"3600\",\n  \""));

        let imported = import_json(&paths).unwrap();
        assert_eq!(imported.public_inputs, workflow.public_inputs().to_vec());
        assert!(Groth16Backend
            .verify(&imported.verifying_key, &imported.public_inputs, &imported.proof)
            .unwrap());
    }

    #[test]
    fn tampered_alphabeta_rejected() {
        let workflow = proved();
        let mut vk = VerificationKeyJson::from(workflow.verifying_key());
        vk.vk_alphabeta_12[0][0][0] = "7".into();
        assert!(matches!(vk.to_verifying_key(), Err(ExportError::Inconsistent(_))));
    }

    #[test]
    fn foreign_protocol_rejected() {
        let workflow = proved();
        let mut proof = ProofJson::from(workflow.proof());
        proof.protocol = "plonk".into();
        assert!(matches!(
            proof.to_proof(),
            Err(ExportError::Unsupported { field: "protocol", .. })
        ));
    }

    #[test]
    fn binary_triple_roundtrips() {
        let workflow = proved();
        let dir = tempfile::tempdir().unwrap();
        let public = workflow.public_inputs().to_vec();
        let paths = export_binary(dir.path(), workflow.proof(), workflow.verifying_key(), &public).unwrap();
        let imported = import_binary(&paths).unwrap();
        assert_eq!(&imported.proof, workflow.proof());
        assert_eq!(&imported.verifying_key, workflow.verifying_key());
        assert_eq!(imported.public_inputs, public);
    }

    #[test]
    fn export_refuses_wrong_public_length() {
        let workflow = proved();
        let dir = tempfile::tempdir().unwrap();
        let err = export_json(dir.path(), workflow.proof(), workflow.verifying_key(), &[F::from(1u64)]).unwrap_err();
        assert!(matches!(err, ExportError::Inconsistent(_)));
    }
}
