use crate::showroom::ShowroomState;

pub fn update(state: &mut ShowroomState) {
    state.scene.early_update();
    state.update();
    state.scene.late_update();
}
