#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use pwm_toggle::Config;
use pwm_toggle::mcu::esp32::LedcDriver;

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    esp_println::println!("{}", info);
    loop {}
}

esp_bootloader_esp_idf::esp_app_desc!();

static CONFIG: Config = Config::DEFAULT;

#[esp_hal_embassy::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default().with_cpu_clock(CpuClock::max()));

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_hal_embassy::init(timg0.timer0);

    let driver = LedcDriver::new(peripherals.LEDC, peripherals.GPIO18);
    match pwm_toggle::run_forever(driver, &CONFIG, &mut Delay).await {}
}
