//! Run file naming: `R<NNNNN>_<tag>_Vm_<Vmesh>_Vd_<Edrift>_Pr_<pressure>_Gain_<g>_Shape_<s>_Clock_<c>-<chunk>.<ext>`

#[derive(Debug, Clone)]
pub struct RunParams {
    pub run_number: u32,
    pub tag: String,
    pub vmesh: String,
    pub edrift: String,
    pub pressure: String,
    pub gain: String,
    pub shape: String,
    pub clock: String,
}

impl RunParams {
    pub fn file_stem(&self) -> String {
        format!(
            "R{:05}_{}_Vm_{}_Vd_{}_Pr_{}_Gain_{}_Shape_{}_Clock_{}",
            self.run_number, self.tag, self.vmesh, self.edrift, self.pressure, self.gain, self.shape, self.clock
        )
    }

    pub fn chunk_file_name(&self, chunk: u32, ext: &str) -> String {
        format!("{}-{}.{}", self.file_stem(), chunk, ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_file_name_matches_naming_grammar() {
        let params = RunParams {
            run_number: 7,
            tag: "argon".into(),
            vmesh: "350".into(),
            edrift: "400".into(),
            pressure: "1".into(),
            gain: "1000".into(),
            shape: "100".into(),
            clock: "25".into(),
        };
        assert_eq!(
            params.chunk_file_name(0, "aqs"),
            "R00007_argon_Vm_350_Vd_400_Pr_1_Gain_1000_Shape_100_Clock_25-0.aqs"
        );
    }
}
