use crate::error::{throw_java_exception, JResult, TiltJniError};
use jni::objects::{JClass, JString};
use jni::sys::{jboolean, jfloat, jfloatArray, jint, jlong, jstring, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};
use tiltspot::{
    AccelData, DeviceRotation, FusionConfig, HelperState, LatestSink, MagData, OrientationEstimate,
    SensorAvailability, SensorHelper, SensorReading, SpotAlphas, Subscriptions, TiltError,
};

// One helper per process; JNI entry points are free functions
lazy_static::lazy_static! {
    static ref GLOBAL_HELPER: Mutex<Option<SensorHelper<LatestSink>>> = Mutex::new(None);
}

fn lock_helper() -> JResult<MutexGuard<'static, Option<SensorHelper<LatestSink>>>> {
    GLOBAL_HELPER
        .lock()
        .map_err(|_| TiltJniError::Internal("Failed to acquire global helper lock".to_string()))
}

#[cfg(target_os = "android")]
fn init_logging() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = android_log::init("TiltSpot");
    });
}

#[cfg(not(target_os = "android"))]
fn init_logging() {}

/// SensorEvent timestamps are nanoseconds
fn nanos_to_secs(timestamp_nanos: jlong) -> f64 {
    timestamp_nanos as f64 / 1e9
}

fn to_jboolean(value: bool) -> jboolean {
    if value {
        JNI_TRUE
    } else {
        JNI_FALSE
    }
}

fn float_array(env: &mut JNIEnv, values: &[f32]) -> JResult<jfloatArray> {
    let arr = env
        .new_float_array(values.len() as i32)
        .map_err(|e| TiltJniError::JniError(format!("Failed to allocate float[]: {e}")))?;
    env.set_float_array_region(&arr, 0, values)
        .map_err(|e| TiltJniError::JniError(format!("Failed to fill float[]: {e}")))?;
    Ok(arr.into_raw())
}

fn estimate_triple(estimate: &OrientationEstimate) -> [f32; 3] {
    let (azimuth, pitch, roll) = estimate.as_triple();
    [azimuth as f32, pitch as f32, roll as f32]
}

/// Marshal an optional estimate; `null` means nothing was fused this call.
fn estimate_result(env: &mut JNIEnv, result: JResult<Option<[f32; 3]>>) -> jfloatArray {
    match result.and_then(|triple| match triple {
        Some(values) => float_array(env, &values),
        None => Ok(std::ptr::null_mut()),
    }) {
        Ok(arr) => arr,
        Err(e) => {
            let _ = throw_java_exception(env, &e);
            std::ptr::null_mut()
        }
    }
}

/// JNI: Create the helper and register listeners
/// Parameters: configJson (FusionConfig JSON, null for defaults), sensor availability flags
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_startHelper(
    mut env: JNIEnv,
    _class: JClass,
    config_json: JString,
    has_accelerometer: jboolean,
    has_magnetometer: jboolean,
    can_detect_orientation: jboolean,
) -> jint {
    let config = if config_json.is_null() {
        Ok(None)
    } else {
        env.get_string(&config_json)
            .map(|s| Some(String::from(s)))
            .map_err(|e| TiltJniError::JniError(format!("Failed to read config string: {e}")))
    };
    let availability = SensorAvailability {
        accelerometer: has_accelerometer == JNI_TRUE,
        magnetometer: has_magnetometer == JNI_TRUE,
        orientation: can_detect_orientation == JNI_TRUE,
    };

    match config.and_then(|json| start_helper_impl(json.as_deref(), availability)) {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn parse_config(config_json: Option<&str>) -> JResult<FusionConfig> {
    match config_json {
        None => Ok(FusionConfig::default()),
        Some(json) if json.trim().is_empty() => Ok(FusionConfig::default()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| TiltJniError::InvalidParameters(format!("config JSON: {e}"))),
    }
}

fn start_helper_impl(
    config_json: Option<&str>,
    availability: SensorAvailability,
) -> JResult<Subscriptions> {
    init_logging();
    let mut guard = lock_helper()?;
    if guard.as_ref().map(|h| h.is_running()).unwrap_or(false) {
        return Err(TiltError::AlreadyRunning.into());
    }

    let config = parse_config(config_json)?;
    let mut helper = SensorHelper::new(config, LatestSink::new())?;
    let subscriptions = helper.start(availability)?;
    *guard = Some(helper);

    log::info!("[TiltSpot] Helper started");
    Ok(subscriptions)
}

/// JNI: Unregister listeners and drop transient state
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_stopHelper(
    mut env: JNIEnv,
    _class: JClass,
) -> jint {
    match stop_helper_impl() {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn stop_helper_impl() -> JResult<()> {
    let mut guard = lock_helper()?;
    let helper = guard.as_mut().ok_or(TiltError::NotRunning)?;
    helper.stop()?;
    log::info!("[TiltSpot] Helper stopped");
    Ok(())
}

/// Feed one reading and collect whatever estimate it produced.
fn push_reading(reading: SensorReading) -> JResult<Option<[f32; 3]>> {
    let mut guard = lock_helper()?;
    let Some(helper) = guard.as_mut() else {
        return Ok(None);
    };
    helper.handle(&reading);
    Ok(helper.sink_mut().take().map(|estimate| estimate_triple(&estimate)))
}

/// JNI: Push accelerometer sample
/// Parameters: x, y, z (m/s²), timestamp (SensorEvent nanoseconds)
/// Returns: float[3] {azimuth, pitch, roll} in degrees, or null
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_pushAccelSample(
    mut env: JNIEnv,
    _class: JClass,
    x: jfloat,
    y: jfloat,
    z: jfloat,
    timestamp: jlong,
) -> jfloatArray {
    let result = push_accel_sample_impl(x as f64, y as f64, z as f64, timestamp);
    estimate_result(&mut env, result)
}

fn push_accel_sample_impl(x: f64, y: f64, z: f64, timestamp: jlong) -> JResult<Option<[f32; 3]>> {
    push_reading(SensorReading::Accel(AccelData::new(nanos_to_secs(timestamp), x, y, z)))
}

/// JNI: Push magnetometer sample
/// Parameters: x, y, z (µT), timestamp (SensorEvent nanoseconds)
/// Returns: float[3] {azimuth, pitch, roll} in degrees, or null
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_pushMagSample(
    mut env: JNIEnv,
    _class: JClass,
    x: jfloat,
    y: jfloat,
    z: jfloat,
    timestamp: jlong,
) -> jfloatArray {
    let result = push_mag_sample_impl(x as f64, y as f64, z as f64, timestamp);
    estimate_result(&mut env, result)
}

fn push_mag_sample_impl(x: f64, y: f64, z: f64, timestamp: jlong) -> JResult<Option<[f32; 3]>> {
    push_reading(SensorReading::Mag(MagData::new(nanos_to_secs(timestamp), x, y, z)))
}

/// JNI: Push an OrientationEventListener angle (-1 = ORIENTATION_UNKNOWN)
/// Returns: current Surface.ROTATION_* code, or -1 when the helper is not running
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_pushOrientation(
    mut env: JNIEnv,
    _class: JClass,
    degrees: jint,
) -> jint {
    match push_orientation_impl(degrees) {
        Ok(code) => code,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn push_orientation_impl(degrees: jint) -> JResult<jint> {
    let degrees = u32::try_from(degrees).ok();
    let mut guard = lock_helper()?;
    let Some(helper) = guard.as_mut() else {
        return Ok(-1);
    };
    helper.handle(&SensorReading::Orientation { degrees });
    Ok(helper.rotation().map(DeviceRotation::surface_code).unwrap_or(-1))
}

/// JNI: Apply the display rotation reported by the window manager
/// Parameters: Surface.ROTATION_* code (0..3)
/// Returns: 0 on success, -1 on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_setDisplayRotation(
    mut env: JNIEnv,
    _class: JClass,
    code: jint,
) -> jint {
    match set_display_rotation_impl(code) {
        Ok(_) => 0,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            -1
        }
    }
}

fn set_display_rotation_impl(code: jint) -> JResult<DeviceRotation> {
    let rotation = DeviceRotation::from_surface_code(code)
        .ok_or_else(|| TiltJniError::InvalidParameters(format!("unknown rotation code {code}")))?;
    let mut guard = lock_helper()?;
    let helper = guard.as_mut().ok_or(TiltError::NotRunning)?;
    helper.set_display_rotation(code)?;
    Ok(rotation)
}

/// JNI: Indicator alphas for a tilt
/// Parameters: pitch, roll (degrees)
/// Returns: float[4] {top, bottom, left, right}
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_computeSpotAlphas(
    mut env: JNIEnv,
    _class: JClass,
    pitch: jfloat,
    roll: jfloat,
) -> jfloatArray {
    let alphas = compute_spot_alphas_impl(pitch as f64, roll as f64);
    match float_array(&mut env, &alphas) {
        Ok(arr) => arr,
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            std::ptr::null_mut()
        }
    }
}

fn compute_spot_alphas_impl(pitch_deg: f64, roll_deg: f64) -> [f32; 4] {
    SpotAlphas::from_tilt(pitch_deg, roll_deg).as_array().map(|a| a as f32)
}

/// JNI: Whether listeners are currently registered
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_isRunning(
    mut env: JNIEnv,
    _class: JClass,
) -> jboolean {
    match is_running_impl() {
        Ok(running) => to_jboolean(running),
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            JNI_FALSE
        }
    }
}

fn is_running_impl() -> JResult<bool> {
    Ok(lock_helper()?.as_ref().map(|h| h.is_running()).unwrap_or(false))
}

#[derive(Debug, Serialize)]
struct HelperStatus {
    state: HelperState,
    rotation_degrees: Option<u32>,
    subscriptions: Subscriptions,
}

/// JNI: Helper state, rotation and subscriptions as JSON
/// Returns: JSON string or null on error (throws Java exception)
#[no_mangle]
pub extern "C" fn Java_com_example_tiltspot_JniBinding_getStatusJson(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    match get_status_json_impl() {
        Ok(json_str) => match env.new_string(&json_str) {
            Ok(jstr) => jstr.into_raw(),
            Err(_) => {
                let _ = throw_java_exception(
                    &mut env,
                    &TiltJniError::JniError("Failed to create Java string".to_string()),
                );
                std::ptr::null_mut()
            }
        },
        Err(e) => {
            let _ = throw_java_exception(&mut env, &e);
            std::ptr::null_mut()
        }
    }
}

fn get_status_json_impl() -> JResult<String> {
    let guard = lock_helper()?;
    let status = match guard.as_ref() {
        Some(helper) => HelperStatus {
            state: helper.state(),
            rotation_degrees: helper.rotation().map(DeviceRotation::degrees),
            subscriptions: helper.subscriptions(),
        },
        None => HelperStatus {
            state: HelperState::Idle,
            rotation_degrees: None,
            subscriptions: Subscriptions::default(),
        },
    };
    serde_json::to_string(&status)
        .map_err(|_| TiltJniError::Internal("JSON serialization failed".to_string()))
}
