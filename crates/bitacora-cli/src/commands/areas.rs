use bitacora_core::MedicalArea;

pub fn run_areas() {
    for area in MedicalArea::ALL {
        println!("{area}");
    }
}
