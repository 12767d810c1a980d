#![no_main]
use libfuzzer_sys::fuzz_target;

const MAX_INPUT_SIZE: usize = 1024;

fn do_fuzz(data: &[u8]) {
    if data.len() > MAX_INPUT_SIZE {
        return;
    }
    let _ = exe_ver_rs::pe::read_coff_timestamp(data);
    let _ = exe_ver_rs::pe::find_fixed_info(data);
}

fuzz_target!(|data: &[u8]| {
    do_fuzz(data);
});
